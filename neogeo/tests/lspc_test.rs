use mvs_core::scheduler::LINE_CLOCK;
use mvs_neogeo::video::lspc::Lspc;

#[test]
fn vram_data_write_then_read_round_trips_through_the_address_register() {
    let mut lspc = Lspc::new();
    lspc.vram_addr_w(0x10);
    lspc.vram_modulo_w(1);
    lspc.vram_data_w(0xBEEF);
    lspc.vram_addr_w(0x10);
    lspc.vram_modulo_w(1);
    assert_eq!(lspc.vram_data_r(), 0xBEEF);
}

#[test]
fn negative_modulo_walks_the_address_backwards() {
    let mut lspc = Lspc::new();
    lspc.vram_addr_w(5);
    lspc.vram_modulo_w(-1i16 as u16);
    lspc.vram_data_w(0x1111);
    // address is now 4
    lspc.vram_data_w(0x2222);
    // address is now 3
    lspc.vram_addr_w(4);
    lspc.vram_modulo_w(0);
    assert_eq!(lspc.vram_data_r(), 0x2222);
}

#[test]
fn vram_modulo_register_reads_back_what_was_written() {
    let mut lspc = Lspc::new();
    lspc.vram_modulo_w(0xFFF0);
    assert_eq!(lspc.vram_modulo_r(), 0xFFF0);
}

#[test]
fn mode_register_packs_beam_line_above_the_auto_animation_counter() {
    let lspc = Lspc::new();
    // At clock 0 the line number is 0, so the packed value is just the
    // 0xF8 bias shifted into the high bits with a zero counter below it.
    assert_eq!(lspc.mode_r(0), 0xF8 << 7);
    assert_eq!(lspc.mode_r(LINE_CLOCK), (0xF9u16) << 7);
}

#[test]
fn raster_irq_line_is_none_unless_the_enable_bit_is_set() {
    let mut lspc = Lspc::new();
    assert_eq!(lspc.raster_irq_line(), None);
    lspc.mode_w(120);
    assert_eq!(lspc.raster_irq_line(), None);
    lspc.mode_w((1 << 4) | 120);
    assert_eq!(lspc.raster_irq_line(), Some(120));
}

#[test]
fn auto_animation_counter_advances_once_per_vblank_when_mode_reload_is_zero() {
    let mut lspc = Lspc::new();
    assert_eq!(lspc.auto_animation().0, 0);
    lspc.vblank_tick();
    assert_eq!(lspc.auto_animation().0, 1);
    lspc.vblank_tick();
    lspc.vblank_tick();
    assert_eq!(lspc.auto_animation().0, 3);
}

#[test]
fn auto_animation_counter_advances_once_per_reload_period() {
    let mut lspc = Lspc::new();
    lspc.mode_w(1 << 8); // reload = 1 tick of delay between increments
    lspc.vblank_tick(); // tick == 0: reload, counter -> 1
    lspc.vblank_tick(); // tick == 1: just counts down, counter stays 1
    assert_eq!(lspc.auto_animation().0, 1);
    lspc.vblank_tick(); // tick == 0 again: reload, counter -> 2
    assert_eq!(lspc.auto_animation().0, 2);
}

#[test]
fn auto_animation_enabled_flag_tracks_mode_bit_three() {
    let mut lspc = Lspc::new();
    assert!(lspc.auto_animation().1);
    lspc.mode_w(1 << 3);
    assert!(!lspc.auto_animation().1);
    lspc.mode_w(0);
    assert!(lspc.auto_animation().1);
}
