//! Time sources consulted by the rate limiter.
//!
//! A [`SleepingTicker`] answers two questions: "what time is it" and "block me for this
//! long". [`SmoothRateLimiter`](crate::SmoothRateLimiter) depends on nothing else, which
//! lets tests swap the real [`SystemTicker`] for a [`VirtualTicker`] and assert exact
//! wait durations without any real elapsed time.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use ticklimit::{SleepingTicker, SmoothRateLimiter, VirtualTicker};
//!
//! let ticker = Arc::new(VirtualTicker::new());
//! let limiter = SmoothRateLimiter::create(Arc::clone(&ticker), 2.0).unwrap();
//!
//! limiter.acquire();
//! limiter.acquire();
//!
//! assert_eq!(ticker.read(), 500_000_000);
//! assert_eq!(ticker.read_events_and_clear(), vec!["R0.50"]);
//! ```

use std::{sync::Arc, thread, time::Duration, time::Instant};

mod event_recorder;
pub use event_recorder::*;

mod virtual_ticker;
pub use virtual_ticker::*;

/// A monotonic time source that can also block the caller.
///
/// Implementations must be thread-safe: a single limiter may be shared by many threads,
/// and each acquisition reads the ticker and possibly sleeps on it.
pub trait SleepingTicker: Send + Sync {
    /// Current instant in nanoseconds. Never decreases.
    ///
    /// The origin is implementation defined; only differences between readings matter.
    fn read(&self) -> u64;

    /// Block the calling thread for `micros` microseconds, ignoring interruptions.
    fn sleep_micros_uninterruptibly(&self, micros: u64);
}

impl<T: SleepingTicker + ?Sized> SleepingTicker for Arc<T> {
    fn read(&self) -> u64 {
        (**self).read()
    }

    fn sleep_micros_uninterruptibly(&self, micros: u64) {
        (**self).sleep_micros_uninterruptibly(micros)
    }
}

impl<T: SleepingTicker + ?Sized> SleepingTicker for &T {
    fn read(&self) -> u64 {
        (**self).read()
    }

    fn sleep_micros_uninterruptibly(&self, micros: u64) {
        (**self).sleep_micros_uninterruptibly(micros)
    }
}

/// Wall-clock ticker backed by [`Instant`] and [`thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTicker {
    origin: Instant,
}

impl SystemTicker {
    /// Create a ticker whose instant `0` is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepingTicker for SystemTicker {
    fn read(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn sleep_micros_uninterruptibly(&self, micros: u64) {
        // `thread::sleep` already resumes after spurious wakeups until the full
        // duration has passed.
        if micros > 0 {
            thread::sleep(Duration::from_micros(micros));
        }
    }
}
