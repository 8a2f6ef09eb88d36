pub mod cartridge;
pub mod peripherals;
pub mod rom_loader;
pub mod system;
pub mod video;

pub use system::NeoGeoSystem;
