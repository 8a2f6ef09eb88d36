pub mod bus;
pub mod component;
pub mod machine;

pub use bus::{Bus, BusMaster, InterruptState};
pub use component::{BusMasterComponent, Component};
pub use machine::{HostAudio, HostVideo, InputButton, Machine};
