//! Line Sprite Processor: VRAM, the address/data/modulo/mode register
//! protocol, and the sprite-chain + fix-layer rasterizer (§4.F).
//!
//! The register protocol and auto-animation counter are grounded directly
//! on `lspc.c`. The sprite chain walk and fix-layer draw are grounded on
//! `video.c`'s `render_sprites`/`render_fix`, generalized with vertical
//! shrinking, wrap-around, and auto-animation substitution that the
//! original did not implement.

use mvs_core::cache::SpriteCache;
use mvs_core::scheduler::Clock;

use super::palette::Palette;

pub const SCREEN_WIDTH: u32 = 320;
pub const SCREEN_HEIGHT: u32 = 224;
pub const VRAM_WORDS: usize = 34 * 1024;

const SPRITE_ZC_BASE: usize = 0x8000;
const SPRITE_YC_BASE: usize = 0x8200;
const SPRITE_XC_BASE: usize = 0x8400;
const SPRITE_COUNT: usize = 381;
const FIX_BASE: usize = 0x7000;

const ATTR_HFLIP: u16 = 1 << 0;
const ATTR_VFLIP: u16 = 1 << 1;
const ATTR_AA4: u16 = 1 << 2;
const ATTR_AA8: u16 = 1 << 3;

pub struct Lspc {
    vram: Vec<u16>,
    reg_vramaddr: u16,
    reg_vrammod: i16,
    reg_mode: u16,
    aa_counter: u8,
    aa_tick: u8,
}

impl Lspc {
    pub fn new() -> Self {
        Lspc {
            vram: vec![0u16; VRAM_WORDS],
            reg_vramaddr: 0,
            reg_vrammod: 0,
            reg_mode: 0,
            aa_counter: 0,
            aa_tick: 0,
        }
    }

    pub fn vram_addr_w(&mut self, val: u16) {
        self.reg_vramaddr = val;
    }

    pub fn vram_modulo_w(&mut self, val: u16) {
        self.reg_vrammod = val as i16;
    }

    pub fn vram_modulo_r(&self) -> u16 {
        self.reg_vrammod as u16
    }

    pub fn vram_data_w(&mut self, val: u16) {
        let addr = (self.reg_vramaddr as usize) % VRAM_WORDS;
        self.vram[addr] = val;
        self.advance_vram_addr();
    }

    pub fn vram_data_r(&mut self) -> u16 {
        let addr = (self.reg_vramaddr as usize) % VRAM_WORDS;
        let val = self.vram[addr];
        self.advance_vram_addr();
        val
    }

    fn advance_vram_addr(&mut self) {
        let next = (self.reg_vramaddr as i32 + self.reg_vrammod as i32) as u16;
        self.reg_vramaddr = (self.reg_vramaddr & 0x8000) | (next & 0x7FFF);
    }

    /// `0x3C0006` read: beam-position bits packed above the live
    /// auto-animation counter (`lspc_mode_r`).
    pub fn mode_r(&self, clock_frame: Clock) -> u16 {
        let line = clock_frame / mvs_core::scheduler::LINE_CLOCK;
        (((line as u16).wrapping_add(0xF8)) << 7) | (self.aa_counter as u16 & 7)
    }

    pub fn mode_w(&mut self, val: u16) {
        self.reg_mode = val;
    }

    /// Advance the auto-animation timer once per VBlank (`lspc_vblank`).
    pub fn vblank_tick(&mut self) {
        if self.aa_tick == 0 {
            self.aa_tick = (self.reg_mode >> 8) as u8;
            self.aa_counter = self.aa_counter.wrapping_add(1);
        } else {
            self.aa_tick -= 1;
        }
    }

    /// `(frame, enabled)`, mirroring `lspc_get_auto_animation`: disabled
    /// when mode bit 3 is set.
    pub fn auto_animation(&self) -> (u8, bool) {
        (self.aa_counter & 7, self.reg_mode & (1 << 3) == 0)
    }

    /// Raster ("timer") interrupt target scanline, if the mode register's
    /// enable bit is set. `lspc.c`'s `lspc_mode_w` only logs this bit; the
    /// scanline encoding in bits 0..8 is this engine's own, since the
    /// original never wired the interrupt up.
    pub fn raster_irq_line(&self) -> Option<u16> {
        if self.reg_mode & (1 << 4) != 0 {
            Some(self.reg_mode & 0x1FF)
        } else {
            None
        }
    }

    fn vram_word(&self, addr: usize) -> u16 {
        self.vram[addr % VRAM_WORDS]
    }

    /// Render sprites then the fix layer into an RGB24 `width*height*3`
    /// buffer, grounded on `render_sprites`/`render_fix`.
    pub fn render(
        &self,
        fb: &mut [u8],
        palette: &Palette,
        palette_bank: usize,
        fix_rom: &[u8],
        sprite_rom: &[u8],
        sprite_cache: &mut SpriteCache,
    ) {
        fb.fill(0);
        self.render_sprites(fb, palette, palette_bank, sprite_rom, sprite_cache);
        self.render_fix(fb, palette, palette_bank, fix_rom);
    }

    fn render_sprites(
        &self,
        fb: &mut [u8],
        palette: &Palette,
        palette_bank: usize,
        sprite_rom: &[u8],
        sprite_cache: &mut SpriteCache,
    ) {
        let (aa_frame, aa_enabled) = self.auto_animation();
        let mut x: i32 = 0;
        let mut y: i32 = 0;
        let mut height_code: u8 = 0;
        let mut vshrink: u8 = 0;

        for snum in 0..SPRITE_COUNT {
            let zc = self.vram_word(SPRITE_ZC_BASE + snum);
            let yc = self.vram_word(SPRITE_YC_BASE + snum);
            let xc = self.vram_word(SPRITE_XC_BASE + snum);
            let width_tiles = ((zc >> 8) & 0xF) + 1;
            let width_px = width_tiles as i32 * 16;

            if yc & 0x40 == 0 {
                x = wrap9(xc >> 7);
                y = 496 - wrap9(yc >> 7);
                height_code = (yc & 0x3F) as u8;
                vshrink = (zc & 0xFF) as u8;
            } else {
                x += width_px;
            }

            if height_code == 0 {
                continue;
            }

            let ss = (height_code as usize).min(32);
            let tilemap_base = snum * 64;
            let mut out_y = y;

            for i in 0..ss {
                let tnum_raw = self.vram_word(tilemap_base + i * 2);
                let attr = self.vram_word(tilemap_base + i * 2 + 1);
                let mut tnum = (tnum_raw as u32) | (((attr as u32) << 12) & 0xF0000);

                if aa_enabled {
                    if attr & ATTR_AA4 != 0 {
                        tnum = (tnum & !0x3) | (aa_frame as u32 & 0x3);
                    } else if attr & ATTR_AA8 != 0 {
                        tnum = (tnum & !0x7) | (aa_frame as u32 & 0x7);
                    }
                }

                let hflip = attr & ATTR_HFLIP != 0;
                let vflip = attr & ATTR_VFLIP != 0;
                let pal_base = ((attr as usize) >> 4) & 0xFF0;

                let lines = tile_lines_drawn(vshrink, i % 16);
                if lines == 0 {
                    continue;
                }

                let pixels = sprite_tile_pixels(sprite_cache, sprite_rom, tnum);
                for line in 0..lines {
                    let src_row = if vflip { 15 - line } else { line };
                    let screen_y = out_y + line as i32;
                    if screen_y < 0 || screen_y as u32 >= SCREEN_HEIGHT {
                        continue;
                    }
                    for col in 0..16u32 {
                        let src_col = if hflip { 15 - col } else { col };
                        let p = pixels[src_row as usize * 16 + src_col as usize];
                        if p == 0 {
                            continue;
                        }
                        let screen_x = x + col as i32;
                        if screen_x < 0 || screen_x as u32 >= SCREEN_WIDTH {
                            continue;
                        }
                        let (r, g, b) = palette.decode_rgb(palette_bank, pal_base + p as usize);
                        put_pixel(fb, screen_x as u32, screen_y as u32, r, g, b);
                    }
                }
                out_y += lines as i32;
            }
        }
    }

    /// Tile columns span `32` words of VRAM each (two border words either
    /// side of 28 visible rows); `video.c`'s `render_fix` only walks 38 of
    /// them (matching the original console's 304px-wide visible area).
    /// This renders the full 40 to fill a 320px-wide buffer.
    fn render_fix(&self, fb: &mut [u8], palette: &Palette, palette_bank: usize, fix_rom: &[u8]) {
        const COLUMN_STRIDE: usize = 32;
        const VISIBLE_ROWS: usize = 28;

        for col in 0..(SCREEN_WIDTH as usize / 8) {
            for row in 0..VISIBLE_ROWS {
                let v = self.vram_word(FIX_BASE + COLUMN_STRIDE * (col + 1) + 2 + row);
                let tile_number = (v & 0xFFF) as usize;
                let pal_base = ((v >> 8) & 0xF0) as usize;
                let tile = fix_tile_pixels(fix_rom, tile_number);

                for line in 0..8u32 {
                    let screen_y = row as u32 * 8 + line;
                    if screen_y >= SCREEN_HEIGHT {
                        continue;
                    }
                    for pix in 0..8u32 {
                        let p = tile[(line * 8 + pix) as usize];
                        if p == 0 {
                            continue;
                        }
                        let screen_x = col as u32 * 8 + pix;
                        if screen_x >= SCREEN_WIDTH {
                            continue;
                        }
                        let (r, g, b) = palette.decode_rgb(palette_bank, pal_base + p as usize);
                        put_pixel(fb, screen_x, screen_y, r, g, b);
                    }
                }
            }
        }
    }
}

impl Default for Lspc {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebase a 9-bit coordinate so the top half of its range reads negative
/// (§4.F "Wrap-around").
fn wrap9(v: u16) -> i32 {
    let v = (v & 0x1FF) as i32;
    if v >= 256 {
        v - 512
    } else {
        v
    }
}

fn put_pixel(fb: &mut [u8], x: u32, y: u32, r: u8, g: u8, b: u8) {
    let offset = (y * SCREEN_WIDTH + x) as usize * 3;
    fb[offset] = r;
    fb[offset + 1] = g;
    fb[offset + 2] = b;
}

/// Number of the (up to 16) source lines of tile `group_index` (0..15,
/// the tile's position within its 16-tile shrink group) that are drawn at
/// vertical-shrink code `code`. `0xFF` means unshrunk. Otherwise splits
/// `code` into `q` fully-drawn tiles and a remainder `r` of extra lines
/// drawn from the top of tile `q` — chosen so the total across one
/// 16-tile group is exactly `code` (§8 "Vertical shrink... produces
/// heights 0, 1, 256").
fn tile_lines_drawn(code: u8, group_index: usize) -> u32 {
    if code == 0xFF {
        return 16;
    }
    let q = (code / 16) as usize;
    let r = (code % 16) as u32;
    if group_index < q {
        16
    } else if group_index == q {
        r
    } else {
        0
    }
}

fn sprite_tile_pixels<'a>(cache: &'a mut SpriteCache, rom: &[u8], tnum: u32) -> &'a [u8] {
    if cache.lookup(tnum).is_none() {
        let src_offset = tnum as usize * 128;
        let slot = cache.insert(tnum);
        decode_4bpp_into(rom, src_offset, slot);
    }
    cache.lookup(tnum).unwrap()
}

fn fix_tile_pixels(rom: &[u8], tile_number: usize) -> [u8; 64] {
    let offset = tile_number * 32;
    let mut out = [0u8; 64];
    decode_4bpp_into(rom, offset, &mut out);
    out
}

/// Unpack pre-swizzled 4bpp tile bytes: each byte holds two pixels, high
/// nibble first (§6 "swizzle contracts are on-disk-format assumptions").
fn decode_4bpp_into(rom: &[u8], offset: usize, out: &mut [u8]) {
    for (i, pixel) in out.iter_mut().enumerate() {
        let byte_index = offset + i / 2;
        let byte = *rom.get(byte_index).unwrap_or(&0);
        *pixel = if i % 2 == 0 { byte >> 4 } else { byte & 0xF };
    }
}
