//! Watchdog timer (§4.G "Watchdog"), grounded on `watchdog.c`: a single
//! scheduled event that, left un-kicked, flags a pending reset; any read of
//! `0x300001` reschedules it (`watchdog_kick`).

use std::cell::Cell;
use std::rc::Rc;

use mvs_core::scheduler::{Clock, EventId, Scheduler};

/// `watchdog.c` trips after roughly 3 frames with no kick; a board that's
/// actually running kicks it every single frame via the BIOS/game loop.
pub const WATCHDOG_PERIOD: Clock = mvs_core::scheduler::FRAME_CLOCK * 3;

pub struct Watchdog {
    pending_reset: Rc<Cell<bool>>,
    event: Option<EventId>,
}

impl Watchdog {
    pub fn new() -> Self {
        Watchdog { pending_reset: Rc::new(Cell::new(false)), event: None }
    }

    pub fn install(&mut self, scheduler: &mut Scheduler) {
        let flag = self.pending_reset.clone();
        let id = scheduler.add_event(
            WATCHDOG_PERIOD,
            Box::new(move |_clock| {
                flag.set(true);
                WATCHDOG_PERIOD
            }),
        );
        self.event = Some(id);
    }

    /// `0x300001` read (`watchdog_kick`): push the expiry back out.
    pub fn kick(&self, scheduler: &mut Scheduler) {
        if let Some(id) = self.event {
            scheduler.change_event(id, scheduler.clock() + WATCHDOG_PERIOD);
        }
    }

    /// True once the timer has expired unkicked; the caller resets the CPU
    /// and clears this via [`Watchdog::acknowledge_reset`].
    pub fn reset_pending(&self) -> bool {
        self.pending_reset.get()
    }

    pub fn acknowledge_reset(&self) {
        self.pending_reset.set(false);
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_without_a_kick() {
        let mut wd = Watchdog::new();
        let mut sched = Scheduler::new();
        wd.install(&mut sched);
        for _ in 0..4 {
            sched.run_frame(|to| to);
        }
        assert!(wd.reset_pending());
    }

    #[test]
    fn kicking_every_frame_never_expires() {
        let mut wd = Watchdog::new();
        let mut sched = Scheduler::new();
        wd.install(&mut sched);
        for _ in 0..10 {
            sched.run_frame(|to| to);
            wd.kick(&mut sched);
        }
        assert!(!wd.reset_pending());
    }

    #[test]
    fn acknowledge_clears_the_flag() {
        let mut wd = Watchdog::new();
        let mut sched = Scheduler::new();
        wd.install(&mut sched);
        for _ in 0..4 {
            sched.run_frame(|to| to);
        }
        assert!(wd.reset_pending());
        wd.acknowledge_reset();
        assert!(!wd.reset_pending());
    }
}
