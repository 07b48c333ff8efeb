use crate::{DelayEvent, DelayOrigin, EventRecorder};

#[test]
fn renders_tag_and_two_decimals() {
    assert_eq!(DelayEvent::new(DelayOrigin::Limiter, 500_000).to_string(), "R0.50");
    assert_eq!(DelayEvent::new(DelayOrigin::Limiter, 600_000).to_string(), "R0.60");
    assert_eq!(DelayEvent::new(DelayOrigin::Caller, 1_000_000).to_string(), "U1.00");
    assert_eq!(DelayEvent::new(DelayOrigin::Caller, 0).to_string(), "U0.00");
    assert_eq!(DelayEvent::new(DelayOrigin::Caller, 12_340_000).to_string(), "U12.34");
}

#[test]
fn rounds_half_up_on_hundredths() {
    assert_eq!(DelayEvent::new(DelayOrigin::Limiter, 1_375_000).to_string(), "R1.38");
    assert_eq!(DelayEvent::new(DelayOrigin::Limiter, 625_000).to_string(), "R0.63");
    assert_eq!(DelayEvent::new(DelayOrigin::Limiter, 624_999).to_string(), "R0.62");
    assert_eq!(DelayEvent::new(DelayOrigin::Limiter, 999_999).to_string(), "R1.00");
}

#[test]
fn exposes_origin_and_duration() {
    let event = DelayEvent::new(DelayOrigin::Caller, 250_000);

    assert_eq!(event.origin(), DelayOrigin::Caller);
    assert_eq!(event.micros(), 250_000);
    assert_eq!(event.seconds(), 0.25);
    assert_eq!(DelayOrigin::Limiter.tag(), 'R');
    assert_eq!(DelayOrigin::Caller.tag(), 'U');
}

#[test]
fn drain_preserves_insertion_order_and_clears() {
    let recorder = EventRecorder::new();
    assert!(recorder.is_empty());

    recorder.record(DelayOrigin::Caller, 200_000);
    recorder.record(DelayOrigin::Limiter, 1_000_000);
    recorder.record(DelayOrigin::Caller, 10_000);
    assert_eq!(recorder.len(), 3);

    assert_eq!(recorder.drain_rendered(), vec!["U0.20", "R1.00", "U0.01"]);
    assert!(recorder.is_empty());
    assert!(recorder.drain_rendered().is_empty());
}

#[test]
fn drain_returns_raw_records() {
    let recorder = EventRecorder::new();
    recorder.record(DelayOrigin::Limiter, 42);

    assert_eq!(
        recorder.drain(),
        vec![DelayEvent::new(DelayOrigin::Limiter, 42)]
    );
    assert!(recorder.drain().is_empty());
}
