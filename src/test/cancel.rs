use crate::sim::{EventHandle, EventQueue, SimTime};
use std::cell::Cell;
use std::rc::Rc;

type Log = Vec<&'static str>;

fn note(
    tag: &'static str,
) -> impl FnMut(&mut EventQueue<Log>, &mut Log) -> crate::sim::Outcome<SimTime> {
    move |_, log| {
        log.push(tag);
        Ok(())
    }
}

fn drain(q: &mut EventQueue<Log>) -> Log {
    let mut log = Vec::new();
    while q.run_next(&mut log).unwrap() {}
    log
}

#[test]
fn cancelled_event_never_runs() {
    let mut q: EventQueue<Log> = EventQueue::new();
    q.schedule_at(SimTime(1), note("a")).unwrap();
    let b = q.schedule_at(SimTime(2), note("b")).unwrap();
    q.schedule_at(SimTime(3), note("c")).unwrap();

    assert!(q.cancel(b));
    assert_eq!(q.len(), 2);
    assert_eq!(drain(&mut q), vec!["a", "c"]);
}

#[test]
fn cancel_keeps_earlier_events_in_place() {
    let mut q: EventQueue<Log> = EventQueue::new();
    for (t, tag) in [(1, "a"), (2, "b"), (3, "c"), (5, "e")] {
        q.schedule_at(SimTime(t), note(tag)).unwrap();
    }
    let d = q.schedule_at(SimTime(4), note("d")).unwrap();
    assert!(q.cancel(d));
    assert_eq!(q.peek_next_time(), Some(SimTime(1)));
    assert_eq!(drain(&mut q), vec!["a", "b", "c", "e"]);
}

#[test]
fn cancelling_one_of_two_equal_time_events_leaves_the_other() {
    for victim in 0..2 {
        let mut q: EventQueue<Log> = EventQueue::new();
        let handles = [
            q.schedule_at(SimTime(7), note("first")).unwrap(),
            q.schedule_at(SimTime(7), note("second")).unwrap(),
        ];
        assert_ne!(handles[0], handles[1]);
        assert!(q.cancel(handles[victim]));
        let expected = if victim == 0 { "second" } else { "first" };
        assert_eq!(drain(&mut q), vec![expected]);
    }
}

#[test]
fn cancelling_after_execution_is_a_silent_no_op() {
    let mut q: EventQueue<Log> = EventQueue::new();
    let a = q.schedule_at(SimTime(1), note("a")).unwrap();
    q.schedule_at(SimTime(2), note("b")).unwrap();

    let mut log = Vec::new();
    assert!(q.run_next(&mut log).unwrap());
    assert!(!q.cancel(a));
    assert!(!q.cancel(a));
    assert_eq!(q.len(), 1);
    assert_eq!(drain(&mut q), vec!["b"]);
}

#[test]
fn cancelling_a_stale_handle_from_another_queue_is_a_no_op() {
    let mut other: EventQueue<Log> = EventQueue::new();
    other.schedule_at(SimTime(0), note("x")).unwrap();
    let foreign = other.schedule_at(SimTime(50), note("y")).unwrap();

    let mut q: EventQueue<Log> = EventQueue::new();
    q.schedule_at(SimTime(10), note("a")).unwrap();
    assert!(!q.cancel(foreign));
    assert_eq!(drain(&mut q), vec!["a"]);
}

#[test]
fn self_cancellation_inside_action_is_a_no_op() {
    let mut q: EventQueue<Log> = EventQueue::new();
    let me: Rc<Cell<Option<EventHandle<SimTime>>>> = Rc::new(Cell::new(None));
    let cancelled = Rc::new(Cell::new(true));
    let (me2, cancelled2) = (Rc::clone(&me), Rc::clone(&cancelled));
    let h = q
        .schedule_at(SimTime(3), move |q, log| {
            log.push("self");
            if let Some(h) = me2.get() {
                cancelled2.set(q.cancel(h));
            }
            Ok(())
        })
        .unwrap();
    me.set(Some(h));
    q.schedule_at(SimTime(4), note("next")).unwrap();

    assert_eq!(drain(&mut q), vec!["self", "next"]);
    assert!(!cancelled.get());
}

#[test]
fn action_can_cancel_a_later_event() {
    let mut q: EventQueue<Log> = EventQueue::new();
    let later = q.schedule_at(SimTime(9), note("later")).unwrap();
    q.schedule_at(SimTime(2), move |q, log| {
        log.push("canceller");
        q.cancel(later);
        Ok(())
    })
    .unwrap();
    q.schedule_at(SimTime(5), note("middle")).unwrap();

    assert_eq!(drain(&mut q), vec!["canceller", "middle"]);
    assert_eq!(q.now(), SimTime(5));
}
