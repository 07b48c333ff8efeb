//! Test harness entrypoint.
//!
//! [`VirtualRateLimiter`] wires one [`SmoothRateLimiter`] to one [`VirtualTicker`] so a
//! test can drive the limiter, simulate its own delays and then assert the exact
//! sequence of waits, without real time passing.

use std::sync::Arc;

use crate::{
    DelayEvent, SmoothRateLimiter, SmoothRateLimiterOptions, TicklimitError, VirtualTicker,
};

/// A [`SmoothRateLimiter`] running on virtual time.
///
/// Every wait imposed by the limiter is recorded as `R<seconds>`, every wait simulated by
/// the test through [`sleep_millis`](Self::sleep_millis) as `U<seconds>`, both with two
/// decimals.
///
/// # Examples
///
/// ```
/// use ticklimit::VirtualRateLimiter;
///
/// let rl = VirtualRateLimiter::new(1.0).unwrap();
///
/// rl.limiter().acquire();
/// assert!(rl.read_events_and_clear().is_empty());
///
/// rl.limiter().acquire();
/// assert_eq!(rl.read_events_and_clear(), vec!["R1.00"]);
///
/// rl.sleep_millis(200);
/// assert_eq!(rl.read_events_and_clear(), vec!["U0.20"]);
/// ```
#[derive(Debug)]
pub struct VirtualRateLimiter {
    ticker: Arc<VirtualTicker>,
    limiter: SmoothRateLimiter<Arc<VirtualTicker>>,
}

impl VirtualRateLimiter {
    /// Create a bursty limiter issuing `permits_per_second` on a fresh virtual ticker.
    ///
    /// # Errors
    ///
    /// [`TicklimitError::InvalidConfiguration`] if the rate is not a positive finite number.
    pub fn new(permits_per_second: f64) -> Result<Self, TicklimitError> {
        let ticker = Arc::new(VirtualTicker::new());
        let limiter = SmoothRateLimiter::create(Arc::clone(&ticker), permits_per_second)?;

        Ok(Self { ticker, limiter })
    }

    /// Create a limiter with arbitrary options on a fresh virtual ticker.
    pub fn with_options(options: SmoothRateLimiterOptions) -> Self {
        let ticker = Arc::new(VirtualTicker::new());
        let limiter = SmoothRateLimiter::with_options(Arc::clone(&ticker), options);

        Self { ticker, limiter }
    }

    /// The limiter under test.
    pub fn limiter(&self) -> &SmoothRateLimiter<Arc<VirtualTicker>> {
        &self.limiter
    }

    /// The virtual ticker backing the limiter.
    pub fn ticker(&self) -> &VirtualTicker {
        &self.ticker
    }

    /// Let `millis` milliseconds pass as if the test itself had slept.
    pub fn sleep_millis(&self, millis: u64) {
        self.ticker.sleep_millis(millis);
    }

    /// Drain recorded delays, rendered as `R0.50`, `U1.00`, ...
    pub fn read_events_and_clear(&self) -> Vec<String> {
        self.ticker.read_events_and_clear()
    }

    /// Drain recorded delays as raw records.
    pub fn drain_delay_events(&self) -> Vec<DelayEvent> {
        self.ticker.drain_events()
    }
}
