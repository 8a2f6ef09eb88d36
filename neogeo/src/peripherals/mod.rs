//! Non-video peripherals (§4.G): player/system inputs, the RTC serial
//! device, and the watchdog timer, bundled the way `NeoGeoSystem` holds a
//! single `peripherals` field.

pub mod input;
pub mod rtc;
pub mod watchdog;

pub use input::InputState;
pub use rtc::Rtc;
pub use watchdog::Watchdog;

use mvs_core::scheduler::{Clock, EventId, Scheduler};

pub struct Peripherals {
    pub input: InputState,
    pub rtc: Rtc,
    pub watchdog: Watchdog,
    rtc_event: Option<EventId>,
    watchdog_kick_requested: bool,
    pending_rtc_period: Option<Clock>,
}

impl Peripherals {
    pub fn new() -> Self {
        Peripherals {
            input: InputState::default(),
            rtc: Rtc::new(),
            watchdog: Watchdog::new(),
            rtc_event: None,
            watchdog_kick_requested: false,
            pending_rtc_period: None,
        }
    }

    /// Register both peripherals' scheduled events. Called once from
    /// `NeoGeoSystem::new`.
    pub fn install(&mut self, scheduler: &mut Scheduler) {
        self.rtc_event = Some(self.rtc.install(scheduler));
        self.watchdog.install(scheduler);
    }

    /// `0x300001` read (`watchdog_kick`). Recorded rather than applied
    /// immediately: the caller runs from inside the scheduler's own
    /// `run_frame` callback, which already holds the scheduler borrowed, so
    /// the reschedule is deferred to [`Peripherals::flush_pending`].
    pub fn request_watchdog_kick(&mut self) {
        self.watchdog_kick_requested = true;
    }

    /// `0x380051` write, same deferral reasoning as the watchdog kick above.
    pub fn write_rtc_serial(&mut self, val: u8) {
        if let Some(period) = self.rtc.write_serial(val) {
            self.pending_rtc_period = Some(period);
        }
    }

    /// Apply any reschedule requests accumulated during the frame just run.
    /// Must be called once per frame, after the scheduler has regained
    /// exclusive access (i.e. outside `Scheduler::run_frame`'s callback).
    pub fn flush_pending(&mut self, scheduler: &mut Scheduler) {
        if self.watchdog_kick_requested {
            self.watchdog.kick(scheduler);
            self.watchdog_kick_requested = false;
        }
        if let Some(period) = self.pending_rtc_period.take() {
            if let Some(id) = self.rtc_event {
                scheduler.change_event(id, scheduler.clock() + period);
            }
        }
    }
}

impl Default for Peripherals {
    fn default() -> Self {
        Self::new()
    }
}
