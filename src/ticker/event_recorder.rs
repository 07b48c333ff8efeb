use std::fmt;

use parking_lot::Mutex;

const MICROS_PER_SECOND: f64 = 1_000_000f64;
const MICROS_PER_HUNDREDTH: u64 = 10_000;

/// Who caused a simulated delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayOrigin {
    /// The rate limiter blocked the caller. Rendered as `R`.
    Limiter,
    /// Test code simulated the passage of time. Rendered as `U`.
    Caller,
}

impl DelayOrigin {
    /// Single-letter tag used when rendering events.
    pub fn tag(self) -> char {
        match self {
            DelayOrigin::Limiter => 'R',
            DelayOrigin::Caller => 'U',
        }
    }
}

/// One simulated delay.
///
/// Displays as the origin tag followed by the duration in seconds with exactly two
/// decimals, e.g. `R0.50` or `U1.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayEvent {
    origin: DelayOrigin,
    micros: u64,
}

impl DelayEvent {
    pub(crate) fn new(origin: DelayOrigin, micros: u64) -> Self {
        Self { origin, micros }
    }

    /// Who caused the delay.
    pub fn origin(&self) -> DelayOrigin {
        self.origin
    }

    /// Length of the delay in microseconds.
    pub fn micros(&self) -> u64 {
        self.micros
    }

    /// Length of the delay in seconds.
    pub fn seconds(&self) -> f64 {
        self.micros as f64 / MICROS_PER_SECOND
    }
}

impl fmt::Display for DelayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Half-up on whole microseconds: 0.625 s renders as `0.63`.
        let hundredths =
            self.micros.saturating_add(MICROS_PER_HUNDREDTH / 2) / MICROS_PER_HUNDREDTH;
        write!(f, "{}{}.{:02}", self.origin.tag(), hundredths / 100, hundredths % 100)
    }
}

/// Ordered log of simulated delays.
///
/// Grows by one entry per recorded delay and is only emptied by [`EventRecorder::drain`].
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<DelayEvent>>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delay of `micros` microseconds caused by `origin`.
    pub fn record(&self, origin: DelayOrigin, micros: u64) {
        self.events.lock().push(DelayEvent::new(origin, micros));
    }

    /// Number of events recorded since the last drain.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded since the last drain.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Take every recorded event in insertion order, leaving the log empty.
    pub fn drain(&self) -> Vec<DelayEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Like [`drain`](Self::drain), rendering each event with its `Display` form.
    pub fn drain_rendered(&self) -> Vec<String> {
        self.drain().iter().map(ToString::to_string).collect()
    }
}
