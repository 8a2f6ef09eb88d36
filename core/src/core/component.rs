use super::bus::BusMaster;

/// Anything that advances by discrete time units (CPUs, video chips, sound chips).
pub trait Component {
    /// Advance one significant step in this component's clock domain.
    /// Returns true if a notable boundary occurred (e.g. instruction boundary).
    fn tick(&mut self) -> bool;

    /// Master clock cycles consumed per tick (for clock-domain crossing).
    /// The 68000 runs at crystal/2 (§3 "emulated clock").
    fn clock_divider(&self) -> u64 {
        1
    }
}

/// Extension for components that act as bus masters (CPUs, DMA controllers).
pub trait BusMasterComponent: Component {
    type Bus: super::bus::Bus + ?Sized;

    /// Execute one cycle (here: one instruction) with bus access.
    /// Returns true at an instruction boundary.
    fn tick_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> bool;
}
