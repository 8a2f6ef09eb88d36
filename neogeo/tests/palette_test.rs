use mvs_neogeo::video::palette::{self, Palette, BANKS, ENTRIES_PER_BANK};

#[test]
fn transparent_index_zero_is_always_black() {
    let pal = Palette::new();
    assert_eq!(pal.decode_rgb(0, 0), (0, 0, 0));
}

#[test]
fn select_bank_out_of_range_wraps_to_a_valid_bank() {
    let mut pal = Palette::new();
    pal.write_word(0, 0x7FFF);
    pal.select_bank(BANKS + 4);
    // Bank selection masks to the number of real banks (two), so this
    // lands back on bank 0.
    assert_eq!(pal.active_bank(), 0);
    assert_eq!(pal.read_word(0), 0x7FFF);
}

#[test]
fn full_white_decodes_to_near_max_rgb() {
    // All five/five/five color bits plus the shared dark bit set.
    let (r, g, b) = palette::decode_rgb(0x8000 | 0x7FFF);
    assert_eq!((r, g, b), (0xFF, 0xFF, 0xFF));
}

#[test]
fn last_entry_of_each_bank_is_independently_addressable() {
    let mut pal = Palette::new();
    let last = (ENTRIES_PER_BANK - 1) * 2;
    pal.write_word(last as u32, 0x1234);
    assert_eq!(pal.read_word(last as u32), 0x1234);
}
