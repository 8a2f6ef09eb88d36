//! Deadline-ordered event scheduler (§4.E), grounded directly on the
//! original `emu.c` event loop: a small fixed-size table of pending events,
//! each carrying an absolute clock deadline and a callback; `run_frame`
//! drains every event due before the next vsync deadline, running the CPU
//! up to each one in turn.

/// Master clock, in emulated-hardware cycles (24 MHz crystal, §3 "emulated
/// clock"). Never resets during a session; wraps only after ~2^64 cycles.
pub type Clock = u64;

pub const MVS_CLOCK_HZ: Clock = 24_000_000;
pub const FPS: Clock = 60;
pub const FRAME_CLOCK: Clock = MVS_CLOCK_HZ / FPS;
pub const LINE_CLOCK: Clock = FRAME_CLOCK / 264;

/// Event table capacity. Eight slots cover every peripheral this engine
/// schedules (vblank, three raster IRQ lines, watchdog, RTC tick) with
/// headroom; exceeding it is a sizing bug (§7 "Internal invariants").
pub const MAX_EVENTS: usize = 8;

/// An event callback is given the clock it actually fired at (which may be
/// later than its scheduled deadline if the CPU overshot) and returns the
/// number of cycles until it should fire again, or 0 to not repeat.
pub type EventCallback = Box<dyn FnMut(Clock) -> Clock>;

struct Slot {
    deadline: Clock,
    callback: EventCallback,
}

/// A handle returned by [`Scheduler::add_event`], used to reschedule or
/// cancel that event later without searching the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventId(usize);

/// The event table plus master clock. Owns no hardware state itself; the
/// machine aggregate drives the CPU and calls back into event callbacks
/// that mutate peripheral state directly.
pub struct Scheduler {
    clock: Clock,
    clock_frame_begin: Clock,
    slots: Vec<Option<Slot>>,
}

impl Scheduler {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_EVENTS);
        slots.resize_with(MAX_EVENTS, || None);
        Scheduler { clock: 0, clock_frame_begin: 0, slots }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn clock_frame(&self) -> Clock {
        self.clock - self.clock_frame_begin
    }

    /// Register a new event at absolute `deadline`. Panics if the table is
    /// full — eight slots is an invariant of this board's peripheral set,
    /// not a soft limit (§7).
    pub fn add_event(&mut self, deadline: Clock, callback: EventCallback) -> EventId {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(Slot { deadline, callback });
                return EventId(i);
            }
        }
        panic!("scheduler event table full (MAX_EVENTS = {MAX_EVENTS})");
    }

    /// Reschedule an existing event to a new absolute deadline.
    pub fn change_event(&mut self, id: EventId, new_deadline: Clock) {
        if let Some(slot) = self.slots[id.0].as_mut() {
            slot.deadline = new_deadline;
        }
    }

    /// Cancel an event permanently, freeing its slot.
    pub fn cancel_event(&mut self, id: EventId) {
        self.slots[id.0] = None;
    }

    /// Find the slot with the soonest deadline, if any events are pending.
    fn next_event_index(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s.deadline)))
            .min_by_key(|&(_, deadline)| deadline)
            .map(|(i, _)| i)
    }

    /// Run one frame's worth of events and CPU execution.
    ///
    /// `run_cpu_to` advances the CPU (and any other bus masters) up to the
    /// given clock value and returns the clock it actually reached — which
    /// may overshoot the requested deadline by at most one instruction,
    /// since the interpreter only checks the clock between instructions.
    pub fn run_frame(&mut self, mut run_cpu_to: impl FnMut(Clock) -> Clock) {
        self.clock_frame_begin = self.clock;
        let vsync = self.clock + FRAME_CLOCK;

        while let Some(idx) = self.next_event_index() {
            let deadline = self.slots[idx].as_ref().unwrap().deadline;
            if deadline >= vsync {
                break;
            }
            self.clock = run_cpu_to(deadline);

            let slot = self.slots[idx].as_mut().unwrap();
            let repeat = (slot.callback)(self.clock);
            if repeat != 0 {
                slot.deadline += repeat;
            } else {
                self.slots[idx] = None;
            }
        }

        self.clock = run_cpu_to(vsync);
        self.clock = vsync;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
