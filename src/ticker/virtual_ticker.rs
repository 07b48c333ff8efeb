use std::sync::atomic::{AtomicU64, Ordering};

use crate::{DelayEvent, DelayOrigin, EventRecorder, SleepingTicker};

const NANOS_PER_MICRO: u64 = 1_000;
const MICROS_PER_MILLI: u64 = 1_000;

/// A ticker that never really sleeps.
///
/// Every sleep advances an internal nanosecond counter by exactly the requested amount
/// and appends a [`DelayEvent`] to the owned [`EventRecorder`]. Sleeps requested by the
/// limiter through [`SleepingTicker::sleep_micros_uninterruptibly`] are tagged
/// [`DelayOrigin::Limiter`]; sleeps requested by test code through
/// [`VirtualTicker::sleep_millis`] are tagged [`DelayOrigin::Caller`].
///
/// Intended for single test cases. It is `Sync` so that it can back a limiter shared
/// between threads, but event order under concurrent use is simply the order in which
/// the sleeps were recorded.
#[derive(Debug, Default)]
pub struct VirtualTicker {
    instant: AtomicU64,
    recorder: EventRecorder,
}

impl VirtualTicker {
    /// Create a ticker at instant `0` with an empty event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate `millis` milliseconds passing on behalf of the caller.
    pub fn sleep_millis(&self, millis: u64) {
        self.sleep_micros(DelayOrigin::Caller, millis.saturating_mul(MICROS_PER_MILLI));
    }

    /// Advance by `micros` microseconds and record the delay under `origin`.
    pub fn sleep_micros(&self, origin: DelayOrigin, micros: u64) {
        let nanos = micros.saturating_mul(NANOS_PER_MICRO);
        let _ = self
            .instant
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |instant| {
                Some(instant.saturating_add(nanos))
            });

        tracing::trace!(tag = %origin.tag(), micros, "virtual_ticker.sleep");
        self.recorder.record(origin, micros);
    }

    /// The event log owned by this ticker.
    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    /// Drain the event log, returning the raw records.
    pub fn drain_events(&self) -> Vec<DelayEvent> {
        self.recorder.drain()
    }

    /// Drain the event log, returning rendered records such as `R0.50` or `U1.00`.
    pub fn read_events_and_clear(&self) -> Vec<String> {
        self.recorder.drain_rendered()
    }
}

impl SleepingTicker for VirtualTicker {
    fn read(&self) -> u64 {
        self.instant.load(Ordering::Acquire)
    }

    fn sleep_micros_uninterruptibly(&self, micros: u64) {
        self.sleep_micros(DelayOrigin::Limiter, micros);
    }
}
