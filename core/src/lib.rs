pub mod cache;
pub mod core;
pub mod cpu;
pub mod memory;
pub mod scheduler;

pub mod prelude {
    pub use crate::core::machine::{HostAudio, HostVideo, InputButton, Machine};
    pub use crate::core::{Bus, BusMaster, BusMasterComponent, Component, bus::InterruptState};
    pub use crate::cpu::Cpu;
    pub use crate::memory::{Bank, MemoryDecoder};
    pub use crate::scheduler::{Clock, EventCallback, Scheduler};
}
