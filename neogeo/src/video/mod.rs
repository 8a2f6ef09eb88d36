//! Video subsystem: palette RAM and the LSPC rasterizer (§4.F).

pub mod lspc;
pub mod palette;

pub use lspc::Lspc;
pub use palette::Palette;
