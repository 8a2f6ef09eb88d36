//! RTC serial shift register (§4.G "RTC"), grounded on `rtc.c`: three
//! edge-detected control lines (data/clock/strobe) shift a 4-bit command
//! into `cmd`; the two implemented commands pick the frequency of a
//! periodic event that toggles the polled TP bit. Rescheduling that event
//! is the caller's job (see [`Rtc::write_serial`]'s return value) since the
//! [`mvs_core::scheduler::Scheduler`] that owns the event table lives
//! outside this struct.

use std::cell::Cell;
use std::rc::Rc;

use mvs_core::scheduler::{Clock, Scheduler, MVS_CLOCK_HZ};

const CMD_TP_1HZ: u8 = 8;
const CMD_TP_4096HZ: u8 = 7;

pub struct Rtc {
    data_in: u8,
    clock: u8,
    cmd: u8,
    tp: Rc<Cell<bool>>,
}

impl Rtc {
    pub fn new() -> Self {
        Rtc { data_in: 0, clock: 0, cmd: 0, tp: Rc::new(Cell::new(false)) }
    }

    /// Register the TP-toggle event at its default 1 Hz half-period;
    /// mirrors `rtc_init`'s unconditional `emu_add_event`. Returns the
    /// handle so the owner can reschedule it when a command changes the
    /// selected frequency.
    pub fn install(&self, scheduler: &mut Scheduler) -> mvs_core::scheduler::EventId {
        let tp = self.tp.clone();
        let half_period = MVS_CLOCK_HZ / 2;
        scheduler.add_event(
            half_period,
            Box::new(move |_clock| {
                tp.set(!tp.get());
                half_period
            }),
        )
    }

    /// `0x380051` write: data bit0, clock bit1, strobe bit2. Returns the
    /// new TP half-period (in clock cycles) if the strobed command
    /// selected one, so the caller can [`Scheduler::change_event`] it.
    pub fn write_serial(&mut self, val: u8) -> Option<Clock> {
        self.data_w(val & 1 != 0);
        self.clock_w(val & 2 != 0);
        self.strobe_w(val & 4 != 0)
    }

    fn data_w(&mut self, bit: bool) {
        self.data_in = bit as u8;
    }

    fn clock_w(&mut self, bit: bool) {
        if self.clock == 0 && bit {
            self.cmd = (self.cmd >> 1) | (self.data_in << 3);
        }
        self.clock = bit as u8;
    }

    fn strobe_w(&mut self, bit: bool) -> Option<Clock> {
        if !bit {
            return None;
        }
        match self.cmd {
            CMD_TP_1HZ => Some(MVS_CLOCK_HZ / 2),
            CMD_TP_4096HZ => Some(MVS_CLOCK_HZ / 4096 / 2),
            _ => None,
        }
    }

    pub fn data_r(&self) -> u8 {
        1
    }

    pub fn tp_r(&self) -> u8 {
        self.tp.get() as u8
    }
}

impl Default for Rtc {
    fn default() -> Self {
        Self::new()
    }
}
