use crate::sim::{EventQueue, Interrupt, SimError, SimTime, Timestamp};
use std::fmt;

fn push(
    id: u32,
) -> impl FnMut(&mut EventQueue<Vec<u32>>, &mut Vec<u32>) -> crate::sim::Outcome<SimTime> {
    move |_, log| {
        log.push(id);
        Ok(())
    }
}

#[test]
fn events_dispatch_in_time_order_and_clock_follows() {
    let mut q: EventQueue<Vec<u32>> = EventQueue::new();
    q.schedule_at(SimTime(10), push(1)).unwrap();
    q.schedule_at(SimTime(5), push(2)).unwrap();
    q.schedule_at(SimTime(7), push(3)).unwrap();

    let mut log = Vec::new();
    let mut times = Vec::new();
    while q.run_next(&mut log).unwrap() {
        times.push(q.now());
    }

    assert_eq!(log, vec![2, 3, 1]);
    assert_eq!(times, vec![SimTime(5), SimTime(7), SimTime(10)]);
    assert_eq!(q.dispatched(), 3);
    assert!(q.is_empty());
}

#[test]
fn run_next_on_empty_queue_returns_false() {
    let mut q: EventQueue = EventQueue::new();
    assert!(!q.run_next(&mut ()).unwrap());
    assert_eq!(q.now(), SimTime::ZERO);
    assert_eq!(q.dispatched(), 0);
}

#[test]
fn scheduling_before_now_fails_on_empty_and_non_empty_queue() {
    let mut q: EventQueue = EventQueue::starting_at(SimTime(100));
    let err = q.schedule_at(SimTime(99), |_, _| Ok(())).unwrap_err();
    assert!(matches!(
        err,
        SimError::OutOfOrderScheduling {
            requested: SimTime(99),
            now: SimTime(100)
        }
    ));
    assert!(q.is_empty());

    q.schedule_at(SimTime(200), |_, _| Ok(())).unwrap();
    assert!(q.schedule_at(SimTime(50), |_, _| Ok(())).is_err());
    assert_eq!(q.len(), 1);
}

#[test]
fn negative_delay_is_rejected_through_schedule_at() {
    let mut q: EventQueue<(), i64> = EventQueue::starting_at(10);
    assert!(q.schedule_after(-1, |_, _| Ok(())).is_err());
    let h = q.schedule_after(0, |_, _| Ok(())).unwrap();
    assert_eq!(h.at(), 10);
}

#[test]
fn scheduling_at_now_inside_action_runs_after_current_event() {
    let mut q: EventQueue<Vec<u32>> = EventQueue::new();
    q.schedule_at(SimTime::ZERO, |q, log| {
        log.push(1);
        q.schedule_at(q.now(), push(2))?;
        Ok(())
    })
    .unwrap();

    let mut log = Vec::new();
    while q.run_next(&mut log).unwrap() {}
    assert_eq!(log, vec![1, 2]);
    assert_eq!(q.now(), SimTime::ZERO);
}

#[test]
fn peek_inside_action_sees_next_event_not_current() {
    let mut q: EventQueue<Vec<Option<SimTime>>> = EventQueue::new();
    q.schedule_at(SimTime(3), |q, seen| {
        seen.push(q.peek_next_time());
        Ok(())
    })
    .unwrap();
    q.schedule_at(SimTime(8), |q, seen| {
        seen.push(q.peek_next_time());
        Ok(())
    })
    .unwrap();
    assert_eq!(q.peek_next_time(), Some(SimTime(3)));

    let mut seen = Vec::new();
    while q.run_next(&mut seen).unwrap() {}
    assert_eq!(seen, vec![Some(SimTime(8)), None]);
    assert_eq!(q.peek_next_time(), None);
}

#[test]
fn run_to_advances_exactly_and_is_idempotent() {
    let mut q: EventQueue<Vec<u32>> = EventQueue::new();
    q.schedule_at(SimTime(2), push(1)).unwrap();
    q.schedule_at(SimTime(5), push(2)).unwrap();
    q.schedule_at(SimTime(9), push(3)).unwrap();

    let mut log = Vec::new();
    q.run_to(SimTime(7), &mut log).unwrap();
    assert_eq!(log, vec![1, 2]);
    assert_eq!(q.now(), SimTime(7));
    assert_eq!(q.len(), 1);

    q.run_to(SimTime(7), &mut log).unwrap();
    q.run_to(SimTime(4), &mut log).unwrap();
    assert_eq!(log, vec![1, 2]);
    assert_eq!(q.now(), SimTime(7));
    assert_eq!(q.peek_next_time(), Some(SimTime(9)));
}

#[test]
fn run_to_fires_events_exactly_at_bound() {
    let mut q: EventQueue<Vec<u32>> = EventQueue::new();
    q.schedule_at(SimTime(5), push(1)).unwrap();
    let mut log = Vec::new();
    q.run_to(SimTime(5), &mut log).unwrap();
    assert_eq!(log, vec![1]);
    assert_eq!(q.now(), SimTime(5));
    assert!(q.is_empty());
}

#[test]
fn run_to_on_empty_queue_still_moves_clock() {
    let mut q: EventQueue = EventQueue::new();
    q.run_to(SimTime(7), &mut ()).unwrap();
    assert_eq!(q.now(), SimTime(7));
    assert!(q.is_empty());
}

#[test]
fn each_yields_clock_after_every_dispatch() {
    let mut q: EventQueue<Vec<u32>> = EventQueue::new();
    for (t, id) in [(4, 1), (1, 2), (4, 3), (6, 4)] {
        q.schedule_at(SimTime(t), push(id)).unwrap();
    }
    let mut log = Vec::new();
    let times: Vec<SimTime> = q.each(&mut log).map(Result::unwrap).collect();
    assert_eq!(times, vec![SimTime(1), SimTime(4), SimTime(4), SimTime(6)]);
    assert_eq!(log.len(), 4);
}

#[test]
fn each_is_infinite_with_recurring_event() {
    let mut q: EventQueue = EventQueue::new();
    q.every(SimTime(3), SimTime(1), |_, _| Ok(())).unwrap();
    let times: Vec<SimTime> = q.each(&mut ()).take(4).map(Result::unwrap).collect();
    assert_eq!(times, vec![SimTime(1), SimTime(4), SimTime(7), SimTime(10)]);
    assert_eq!(q.len(), 1);
}

#[test]
fn reset_drops_pending_and_sets_clock() {
    let mut q: EventQueue<Vec<u32>> = EventQueue::new();
    q.schedule_at(SimTime(5), push(1)).unwrap();
    q.schedule_at(SimTime(6), push(2)).unwrap();
    q.reset(SimTime(2));
    assert!(q.is_empty());
    assert_eq!(q.now(), SimTime(2));

    let mut log = Vec::new();
    assert!(!q.run_next(&mut log).unwrap());
    assert!(log.is_empty());
    assert!(q.schedule_at(SimTime(1), push(3)).is_err());
}

#[derive(Debug)]
struct Boom;

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boom")
    }
}

impl std::error::Error for Boom {}

#[test]
fn action_error_propagates_and_event_is_not_retried() {
    let mut q: EventQueue<Vec<u32>> = EventQueue::new();
    q.schedule_at(SimTime(1), |_, log| {
        log.push(1);
        Err(Interrupt::fail(Boom))
    })
    .unwrap();
    q.schedule_at(SimTime(2), push(2)).unwrap();

    let mut log = Vec::new();
    let err = q.run_next(&mut log).unwrap_err();
    match err {
        Interrupt::Failed(SimError::Action(e)) => assert_eq!(e.to_string(), "boom"),
        other => panic!("unexpected interrupt: {other:?}"),
    }
    assert_eq!(q.now(), SimTime(1));
    assert_eq!(q.len(), 1);

    while q.run_next(&mut log).unwrap() {}
    assert_eq!(log, vec![1, 2]);
}

fn drain_times<T: Timestamp>(q: &mut EventQueue<Vec<T>, T>) -> Vec<T> {
    let mut seen = Vec::new();
    while q.run_next(&mut seen).unwrap() {}
    seen
}

#[test]
fn queue_is_generic_over_time_representation() {
    let mut q: EventQueue<Vec<u32>, u32> = EventQueue::new();
    for t in [30u32, 10, 20] {
        q.schedule_at(t, |q, seen| {
            seen.push(q.now());
            Ok(())
        })
        .unwrap();
    }
    assert_eq!(drain_times(&mut q), vec![10, 20, 30]);

    let mut q: EventQueue<Vec<crate::sim::Seconds>, crate::sim::Seconds> = EventQueue::new();
    for t in [0.5, 0.125, 2.0] {
        q.schedule_at(crate::sim::Seconds(t), |q, seen| {
            seen.push(q.now());
            Ok(())
        })
        .unwrap();
    }
    let seen = drain_times(&mut q);
    assert_eq!(seen.iter().map(|s| s.0).collect::<Vec<_>>(), vec![0.125, 0.5, 2.0]);
}
