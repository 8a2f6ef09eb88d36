/// Describes a single input button a machine accepts.
pub struct InputButton {
    /// Machine-defined button identifier, passed to `set_input()`.
    pub id: u8,
    /// Human-readable name for display/key-binding purposes.
    pub name: &'static str,
}

/// Machine-agnostic interface for emulated systems.
///
/// The frontend is a pure rendering/input-pump loop that does not know
/// about Neo Geo hardware (LSPC, palette formats, bank layout); it only
/// drives this trait.
pub trait Machine {
    /// Native display resolution as (width, height) in pixels. For this
    /// engine always `(320, 224)` (§1).
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation (advance the clock by one frame's worth
    /// of ticks, §4.E `run_frame`).
    fn run_frame(&mut self);

    /// Render the current video state into an RGB24 pixel buffer.
    ///
    /// The buffer must be at least `width * height * 3` bytes.
    /// Pixels are left-to-right, top-to-bottom, 3 bytes per pixel (R, G, B).
    fn render_frame(&self, buffer: &mut [u8]);

    /// Handle an input event. `button` is a machine-defined ID from
    /// `input_map()`. `pressed` is true for key-down, false for key-up.
    ///
    /// Called per-event, not per-frame; `run_frame()` sees the accumulated
    /// state.
    fn set_input(&mut self, button: u8, pressed: bool);

    /// The list of input buttons this machine accepts.
    fn input_map(&self) -> &[InputButton];

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);

    /// Battery-backed RAM contents to persist across sessions, if the
    /// machine has any (§3 "Backup/battery RAM"). Default: none.
    fn save_nvram(&self) -> Option<&[u8]> {
        None
    }

    /// Restore previously-saved battery-backed RAM. Default: no-op.
    fn load_nvram(&mut self, data: &[u8]) {
        let _ = data;
    }
}

/// Host-facing video presentation seam (§6 "Host adapter interface").
///
/// Described, not specified: a platform adapter implements this to receive
/// the 16-bit RGBA framebuffer produced by [`Machine::render_frame`]-style
/// rendering. Kept separate from `Machine` because it is a *host*
/// responsibility, not an emulated-system one.
pub trait HostVideo {
    type Error: std::fmt::Debug;

    /// Begin a frame, returning a writable pixel buffer and its pitch in
    /// bytes.
    fn begin_frame(&mut self) -> Result<(&mut [u8], usize), Self::Error>;

    /// Present the buffer filled by `begin_frame`.
    fn end_frame(&mut self) -> Result<(), Self::Error>;

    /// Save the most recently presented frame as an image at `path`.
    fn save_screenshot(&mut self, path: &std::path::Path) -> Result<(), Self::Error>;
}

/// Host-facing audio seam. The engine's sound subsystem is a stub (§1
/// Non-goals); this trait exists so a host can still open a device and
/// receive silence without special-casing "no audio" at the call site.
pub trait HostAudio {
    type Error: std::fmt::Debug;

    fn push_samples(&mut self, samples: &[i16]) -> Result<(), Self::Error>;
}
