use mvs_core::scheduler::{FRAME_CLOCK, Scheduler};

#[test]
fn run_frame_with_no_events_advances_clock_to_vsync_exactly() {
    let mut sched = Scheduler::new();
    let start = sched.clock();
    sched.run_frame(|to| to);
    assert_eq!(sched.clock(), start + FRAME_CLOCK);
}

#[test]
fn recurring_event_reschedules_every_frame() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let count = Rc::new(RefCell::new(0u32));
    let mut sched = Scheduler::new();
    let counted = Rc::clone(&count);
    let period = FRAME_CLOCK / 2;
    sched.add_event(
        period,
        Box::new(move |_clock| {
            *counted.borrow_mut() += 1;
            period
        }),
    );

    for _ in 0..4 {
        sched.run_frame(|to| to);
    }

    // Two firings per frame (period is half a frame) over four frames.
    assert_eq!(*count.borrow(), 8);
}

#[test]
fn cancel_event_prevents_further_firings() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let count = Rc::new(RefCell::new(0u32));
    let mut sched = Scheduler::new();
    let counted = Rc::clone(&count);
    let period = FRAME_CLOCK / 2;
    let id = sched.add_event(
        period,
        Box::new(move |_clock| {
            *counted.borrow_mut() += 1;
            period
        }),
    );

    sched.run_frame(|to| to);
    assert_eq!(*count.borrow(), 2);

    sched.cancel_event(id);
    sched.run_frame(|to| to);
    assert_eq!(*count.borrow(), 2);
}

#[test]
#[should_panic(expected = "scheduler event table full")]
fn scheduler_panics_when_event_table_is_exhausted() {
    let mut sched = Scheduler::new();
    for _ in 0..64 {
        sched.add_event(FRAME_CLOCK, Box::new(|_clock| FRAME_CLOCK));
    }
}
