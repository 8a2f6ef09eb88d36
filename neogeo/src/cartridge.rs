//! On-disk cartridge directory loading.
//!
//! Grounded on `rom_loader.rs`'s `RomSet` (directory of named files, each
//! validated for size) plus `roms.c`'s `rom_load`/`ini_get_integer` for the
//! `game.ini` key-value format. No checksum validation: the original loader
//! never checksums Neo Geo cartridges (no romset-authority equivalent to
//! MAME's hash list), so a wrong ROM only ever surfaces as a size mismatch
//! or garbage gameplay, not a load-time error.

use std::fmt;
use std::path::Path;

use crate::rom_loader::{RomLoadError, RomSet};

pub const BIOS_SIZE: usize = 128 * 1024;
pub const FIX_SIZE: usize = 128 * 1024;
pub const PROGRAM_FIXED_SIZE: usize = 1024 * 1024;
pub const MEGABANK_SIZE: usize = 1024 * 1024;

/// Above this size, the banked program ROM window is served from a
/// [`mvs_core::cache::BankCache`] instead of held as one contiguous `Vec`
/// (§4.B "Contract"). Real carts top out around 4-6 MiB of `b.rom`, so this
/// only exercises the cached path in artificial/stress-test cartridges.
pub const LINEAR_BANK_THRESHOLD: usize = 8 * MEGABANK_SIZE;

#[derive(Debug)]
pub enum CartridgeError {
    Rom(RomLoadError),
    /// `p.bios` (or another fixed-size file) was present but the wrong size.
    BadSize { file: &'static str, expected: usize, actual: usize },
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Rom(e) => write!(f, "{e}"),
            CartridgeError::BadSize { file, expected, actual } => {
                write!(f, "{file}: expected {expected} bytes, got {actual}")
            }
        }
    }
}

impl std::error::Error for CartridgeError {}

impl From<RomLoadError> for CartridgeError {
    fn from(e: RomLoadError) -> Self {
        CartridgeError::Rom(e)
    }
}

fn require_exact<'a>(set: &'a RomSet, file: &'static str, size: usize) -> Result<&'a [u8], CartridgeError> {
    let data = set.require(file)?;
    if data.len() != size {
        return Err(CartridgeError::BadSize { file, expected: size, actual: data.len() });
    }
    Ok(data)
}

/// `key=value` text recognized in `game.ini` (§6). Only one key is defined
/// today; unrecognized keys and malformed lines are ignored rather than
/// rejected, matching `ini_get_integer`'s substring-search tolerance.
#[derive(Default, Clone, Copy, Debug)]
pub struct GameConfig {
    pub idle_skip_pc: Option<u32>,
}

impl GameConfig {
    pub fn parse(text: &str) -> GameConfig {
        let mut cfg = GameConfig::default();
        for line in text.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once('=') else { continue };
            let key = key.trim();
            let value = value.trim();
            if key == "idle_skip" {
                cfg.idle_skip_pc = parse_int(value);
            }
        }
        cfg
    }
}

fn parse_int(text: &str) -> Option<u32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// Backend for the banked program-ROM window's [`mvs_core::cache::bank::Backend`],
/// used only once `b.rom` exceeds [`LINEAR_BANK_THRESHOLD`].
pub struct BankedRomBackend {
    data: Vec<u8>,
}

impl mvs_core::cache::bank::Backend for BankedRomBackend {
    fn fetch(&self, addr: u32, out: &mut [u8]) {
        let addr = addr as usize;
        for (i, b) in out.iter_mut().enumerate() {
            *b = *self.data.get(addr + i).unwrap_or(&0xFF);
        }
    }
}

/// Either the whole banked ROM held directly (the common case) or a
/// set-associative cache fetching windows on demand (§4.B).
pub enum ProgramBanked {
    Linear(Vec<u8>),
    Cached(mvs_core::cache::BankCache<BankedRomBackend>),
}

impl ProgramBanked {
    fn from_bytes(data: Vec<u8>) -> ProgramBanked {
        if data.len() <= LINEAR_BANK_THRESHOLD {
            ProgramBanked::Linear(data)
        } else {
            ProgramBanked::Cached(mvs_core::cache::BankCache::cached(BankedRomBackend { data }))
        }
    }

    /// Read one byte at a flat offset into the full (unbanked-view) image.
    pub fn read_byte(&mut self, offset: u32) -> u8 {
        match self {
            ProgramBanked::Linear(data) => *data.get(offset as usize).unwrap_or(&0xFF),
            ProgramBanked::Cached(cache) => {
                let window = cache.lookup(offset);
                let within = (offset as usize) % mvs_core::cache::bank::BANK_SIZE;
                window[within]
            }
        }
    }
}

/// The decoded, in-memory form of a cartridge directory (§6). Holds every
/// ROM region this board maps, plus the `game.ini` settings.
pub struct CartridgeRom {
    pub bios_program: Vec<u8>,
    pub program_fixed: Vec<u8>,
    pub program_banked: ProgramBanked,
    pub bios_fix: Vec<u8>,
    pub cart_fix: Vec<u8>,
    pub sprite_rom: Vec<u8>,
    pub config: GameConfig,
}

impl CartridgeRom {
    /// Load from an already-populated [`RomSet`] (directory or in-memory
    /// slices, §6 "On-disk cartridge directory").
    pub fn from_rom_set(set: &RomSet) -> Result<CartridgeRom, CartridgeError> {
        let bios_program = require_exact(set, "p.bios", BIOS_SIZE)?.to_vec();

        let mut program_fixed = vec![0xFFu8; PROGRAM_FIXED_SIZE];
        let p_rom = set.require("p.rom")?;
        if p_rom.len() > PROGRAM_FIXED_SIZE {
            return Err(CartridgeError::BadSize {
                file: "p.rom",
                expected: PROGRAM_FIXED_SIZE,
                actual: p_rom.len(),
            });
        }
        program_fixed[..p_rom.len()].copy_from_slice(p_rom);

        let program_banked = ProgramBanked::from_bytes(set.get("b.rom").map(|d| d.to_vec()).unwrap_or_default());

        let bios_fix = require_exact(set, "s.bios", FIX_SIZE)?.to_vec();
        let cart_fix = require_exact(set, "s.rom", FIX_SIZE)?.to_vec();
        let sprite_rom = set.require("c.rom")?.to_vec();

        let config = set
            .get("game.ini")
            .map(|bytes| GameConfig::parse(&String::from_utf8_lossy(bytes)))
            .unwrap_or_default();

        Ok(CartridgeRom {
            bios_program,
            program_fixed,
            program_banked,
            bios_fix,
            cart_fix,
            sprite_rom,
            config,
        })
    }

    pub fn from_directory(path: &Path) -> Result<CartridgeRom, CartridgeError> {
        let set = RomSet::from_directory(path)?;
        Self::from_rom_set(&set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_set() -> RomSet {
        RomSet::from_slices(&[
            ("p.bios", &[0u8; BIOS_SIZE]),
            ("p.rom", &[0u8; 0x1000]),
            ("s.bios", &[0u8; FIX_SIZE]),
            ("s.rom", &[0u8; FIX_SIZE]),
            ("c.rom", &[0u8; 0x1000]),
        ])
    }

    #[test]
    fn game_config_parses_hex_idle_skip() {
        let cfg = GameConfig::parse("idle_skip=0x1234\nother=5\n");
        assert_eq!(cfg.idle_skip_pc, Some(0x1234));
    }

    #[test]
    fn game_config_parses_decimal_idle_skip() {
        let cfg = GameConfig::parse("idle_skip=42");
        assert_eq!(cfg.idle_skip_pc, Some(42));
    }

    #[test]
    fn game_config_ignores_unknown_keys_and_blank_lines() {
        let cfg = GameConfig::parse("\nfoo=bar\n\nidle_skip=0x10\n");
        assert_eq!(cfg.idle_skip_pc, Some(0x10));
    }

    #[test]
    fn missing_game_ini_yields_default_config() {
        let set = minimal_set();
        let cart = CartridgeRom::from_rom_set(&set).unwrap();
        assert_eq!(cart.config.idle_skip_pc, None);
    }

    #[test]
    fn p_rom_shorter_than_one_megabyte_is_padded() {
        let set = minimal_set();
        let cart = CartridgeRom::from_rom_set(&set).unwrap();
        assert_eq!(cart.program_fixed.len(), PROGRAM_FIXED_SIZE);
        assert_eq!(cart.program_fixed[0x1000], 0xFF);
    }

    #[test]
    fn missing_required_file_errors() {
        let set = RomSet::from_slices(&[("p.bios", &[0u8; BIOS_SIZE])]);
        let result = CartridgeRom::from_rom_set(&set);
        assert!(result.is_err());
    }

    #[test]
    fn wrong_size_bios_errors() {
        let set = RomSet::from_slices(&[
            ("p.bios", &[0u8; 100]),
            ("p.rom", &[0u8; 0x1000]),
            ("s.bios", &[0u8; FIX_SIZE]),
            ("s.rom", &[0u8; FIX_SIZE]),
            ("c.rom", &[0u8; 0x1000]),
        ]);
        let result = CartridgeRom::from_rom_set(&set);
        assert!(matches!(result, Err(CartridgeError::BadSize { file: "p.bios", .. })));
    }

    #[test]
    fn absent_b_rom_yields_empty_banked_window() {
        let set = minimal_set();
        let mut cart = CartridgeRom::from_rom_set(&set).unwrap();
        assert_eq!(cart.program_banked.read_byte(0), 0xFF);
    }

    #[test]
    fn large_banked_rom_uses_cached_path() {
        let data = vec![0x42u8; LINEAR_BANK_THRESHOLD + 1];
        let banked = ProgramBanked::from_bytes(data);
        assert!(matches!(banked, ProgramBanked::Cached(_)));
    }

    #[test]
    fn small_banked_rom_uses_linear_path() {
        let banked = ProgramBanked::from_bytes(vec![0x11; 16]);
        assert!(matches!(banked, ProgramBanked::Linear(_)));
    }
}
