use std::time::Duration;

use parking_lot::Mutex;

use crate::{
    Permits, PermitsPerSecond, SleepingTicker, SmoothRateLimiterOptions, SmoothingMode,
    TicklimitError, WarmupPeriod,
    smooth::{bursty::Bursty, warming_up::WarmingUp},
};

const MICROS_PER_SECOND: f64 = 1_000_000f64;
const NANOS_PER_MICRO: u64 = 1_000;

#[derive(Debug, Clone, Copy)]
enum Strategy {
    Bursty(Bursty),
    WarmingUp(WarmingUp),
}

impl From<SmoothingMode> for Strategy {
    fn from(mode: SmoothingMode) -> Self {
        match mode {
            SmoothingMode::Bursty { max_burst_seconds } => {
                Strategy::Bursty(Bursty::new(max_burst_seconds))
            }
            SmoothingMode::WarmingUp { warmup_period } => {
                Strategy::WarmingUp(WarmingUp::new(warmup_period))
            }
        }
    }
}

/// Mutable accounting, only ever touched under the limiter's mutex.
///
/// Times are microseconds since the limiter was created.
#[derive(Debug)]
struct LimiterState {
    stored_permits: f64,
    max_permits: f64,
    stable_interval_micros: f64,
    next_free_ticket_micros: u64,
    strategy: Strategy,
}

impl LimiterState {
    fn new(strategy: Strategy) -> Self {
        Self {
            stored_permits: 0f64,
            max_permits: 0f64,
            stable_interval_micros: 0f64,
            next_free_ticket_micros: 0,
            strategy,
        }
    }

    /// Bank the idle time between the next free ticket and `now_micros`.
    fn resync(&mut self, now_micros: u64) {
        if now_micros > self.next_free_ticket_micros {
            let idle_micros = (now_micros - self.next_free_ticket_micros) as f64;
            let replenished = self.stored_permits + idle_micros / self.stable_interval_micros;

            self.stored_permits = replenished.clamp(0f64, self.max_permits);
            self.next_free_ticket_micros = now_micros;
        }
    }

    fn set_rate(&mut self, permits_per_second: f64, now_micros: u64) {
        self.resync(now_micros);

        let stable_interval_micros = MICROS_PER_SECOND / permits_per_second;
        let old_max_permits = self.max_permits;

        let (max_permits, stored_permits) = match &mut self.strategy {
            Strategy::Bursty(bursty) => {
                bursty.apply_rate(permits_per_second, old_max_permits, self.stored_permits)
            }
            Strategy::WarmingUp(warming_up) => warming_up.apply_rate(
                stable_interval_micros,
                old_max_permits,
                self.stored_permits,
            ),
        };

        self.stable_interval_micros = stable_interval_micros;
        self.max_permits = max_permits;
        self.stored_permits = stored_permits.clamp(0f64, max_permits);
    }

    /// Reserve `permits` and return how long the caller must wait for them.
    ///
    /// The wait only covers permits reserved by earlier calls; the permits taken here
    /// move the next free ticket for whoever comes next.
    fn reserve_next_ticket(&mut self, permits: f64, now_micros: u64) -> u64 {
        self.resync(now_micros);

        let micros_to_next_free_ticket = self.next_free_ticket_micros.saturating_sub(now_micros);

        let stored_permits_to_spend = permits.min(self.stored_permits);
        let fresh_permits = permits - stored_permits_to_spend;

        let stored_wait_micros = match &self.strategy {
            Strategy::Bursty(bursty) => bursty.stored_permits_to_wait_time(),
            Strategy::WarmingUp(warming_up) => warming_up
                .stored_permits_to_wait_time(self.stored_permits, stored_permits_to_spend),
        };
        let fresh_wait_micros = (fresh_permits * self.stable_interval_micros) as u64;

        self.next_free_ticket_micros = self
            .next_free_ticket_micros
            .saturating_add(stored_wait_micros.saturating_add(fresh_wait_micros));
        self.stored_permits = (self.stored_permits - stored_permits_to_spend).max(0f64);

        micros_to_next_free_ticket
    }
}

/// Smoothed token-bucket rate limiter driven by a [`SleepingTicker`].
///
/// The limiter borrows its notion of time from `T`: pass an `Arc` (or a reference) to a
/// ticker you keep around to observe it from the outside, e.g. a
/// [`VirtualTicker`](crate::VirtualTicker) in tests.
///
/// # Algorithm
///
/// 1. **Resync:** if the ticker moved past the next free ticket, the idle time is
///    converted into stored permits at the stable rate and clamped to the capacity.
/// 2. **Wait:** the caller waits until the next free ticket (zero if it is in the past).
/// 3. **Reserve:** stored permits are spent first (free for bursty, ramped for
///    warming-up); the remaining fresh permits push the next free ticket back by
///    `fresh × stable_interval`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use ticklimit::{SmoothRateLimiter, VirtualTicker};
///
/// let ticker = Arc::new(VirtualTicker::new());
/// let limiter = SmoothRateLimiter::create(Arc::clone(&ticker), 5.0).unwrap();
///
/// assert_eq!(limiter.acquire(), 0.0);
/// assert_eq!(limiter.acquire(), 0.2);
/// assert_eq!(ticker.read_events_and_clear(), vec!["R0.20"]);
/// ```
pub struct SmoothRateLimiter<T> {
    ticker: T,
    offset_nanos: u64,
    state: Mutex<LimiterState>,
}

impl<T: SleepingTicker> SmoothRateLimiter<T> {
    /// Create a bursty limiter issuing `permits_per_second`, banking at most one second
    /// of idle time.
    ///
    /// # Errors
    ///
    /// [`TicklimitError::InvalidConfiguration`] if the rate is not a positive finite number.
    pub fn create(ticker: T, permits_per_second: f64) -> Result<Self, TicklimitError> {
        Ok(Self::with_options(
            ticker,
            SmoothRateLimiterOptions {
                permits_per_second: PermitsPerSecond::try_from(permits_per_second)?,
                mode: SmoothingMode::default(),
            },
        ))
    }

    /// Create a limiter that starts cold and reaches `permits_per_second` after
    /// `warmup_period` of steady use.
    ///
    /// # Errors
    ///
    /// [`TicklimitError::InvalidConfiguration`] if the rate is not a positive finite number
    /// or the warm-up period is zero.
    pub fn create_warming_up(
        ticker: T,
        permits_per_second: f64,
        warmup_period: Duration,
    ) -> Result<Self, TicklimitError> {
        Ok(Self::with_options(
            ticker,
            SmoothRateLimiterOptions {
                permits_per_second: PermitsPerSecond::try_from(permits_per_second)?,
                mode: SmoothingMode::WarmingUp {
                    warmup_period: WarmupPeriod::try_from(warmup_period)?,
                },
            },
        ))
    }

    /// Create a limiter from already validated options.
    pub fn with_options(ticker: T, options: SmoothRateLimiterOptions) -> Self {
        let offset_nanos = ticker.read();
        let mut state = LimiterState::new(Strategy::from(options.mode));
        state.set_rate(*options.permits_per_second, 0);

        tracing::debug!(
            permits_per_second = *options.permits_per_second,
            max_permits = state.max_permits,
            "smooth_rate_limiter.created"
        );

        Self {
            ticker,
            offset_nanos,
            state: Mutex::new(state),
        }
    } // end constructor

    /// The ticker this limiter reads and sleeps on.
    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    /// Current steady rate in permits per second.
    pub fn rate(&self) -> f64 {
        MICROS_PER_SECOND / self.state.lock().stable_interval_micros
    }

    /// Change the steady rate.
    ///
    /// Time elapsed so far is accounted at the old rate; stored permits keep their share
    /// of the (rescaled) capacity. Requests already waiting are not affected, and the next
    /// request still pays for permits reserved at the old rate.
    ///
    /// # Errors
    ///
    /// [`TicklimitError::InvalidConfiguration`] if the rate is not a positive finite number.
    pub fn set_rate(&self, permits_per_second: f64) -> Result<(), TicklimitError> {
        let permits_per_second = PermitsPerSecond::try_from(permits_per_second)?;

        let mut state = self.state.lock();
        let now_micros = self.read_micros();
        state.set_rate(*permits_per_second, now_micros);

        tracing::debug!(
            permits_per_second = *permits_per_second,
            max_permits = state.max_permits,
            "smooth_rate_limiter.rate_changed"
        );

        Ok(())
    } // end method set_rate

    /// Acquire a single permit, blocking until it is granted.
    ///
    /// Returns the time spent waiting, in seconds.
    pub fn acquire(&self) -> f64 {
        self.acquire_permits(Permits::default())
    }

    /// Acquire `permits`, blocking until they are granted.
    ///
    /// Returns the time spent waiting, in seconds (zero when no wait was needed).
    pub fn acquire_permits(&self, permits: Permits) -> f64 {
        let micros_to_wait = {
            let mut state = self.state.lock();
            let now_micros = self.read_micros();
            state.reserve_next_ticket(*permits as f64, now_micros)
        };

        self.sleep(*permits, micros_to_wait);

        micros_to_wait as f64 / MICROS_PER_SECOND
    } // end method acquire_permits

    /// Acquire a single permit only if it is available right away.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_permits_timeout(Permits::default(), Duration::ZERO)
    }

    /// Acquire `permits` only if they are available right away.
    pub fn try_acquire_permits(&self, permits: Permits) -> bool {
        self.try_acquire_permits_timeout(permits, Duration::ZERO)
    }

    /// Acquire a single permit if it becomes available within `timeout`.
    pub fn try_acquire_timeout(&self, timeout: Duration) -> bool {
        self.try_acquire_permits_timeout(Permits::default(), timeout)
    }

    /// Acquire `permits` if the wait for them does not exceed `timeout`.
    ///
    /// Returns `false` immediately, reserving nothing, when the next free ticket is
    /// further away than `timeout`. Otherwise the permits are reserved and the call
    /// blocks exactly like [`acquire_permits`](Self::acquire_permits), which never takes
    /// longer than `timeout`.
    pub fn try_acquire_permits_timeout(&self, permits: Permits, timeout: Duration) -> bool {
        let timeout_micros = u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX);

        let micros_to_wait = {
            let mut state = self.state.lock();
            let now_micros = self.read_micros();

            if state.next_free_ticket_micros > now_micros.saturating_add(timeout_micros) {
                tracing::trace!(
                    permits = *permits,
                    timeout_micros,
                    "smooth_rate_limiter.try_acquire.rejected"
                );
                return false;
            }

            state.reserve_next_ticket(*permits as f64, now_micros)
        };

        self.sleep(*permits, micros_to_wait);

        true
    } // end method try_acquire_permits_timeout

    #[cfg(test)]
    pub(crate) fn stored_permits(&self) -> f64 {
        self.state.lock().stored_permits
    }

    #[cfg(test)]
    pub(crate) fn max_permits(&self) -> f64 {
        self.state.lock().max_permits
    }

    #[cfg(test)]
    pub(crate) fn next_free_ticket_micros(&self) -> u64 {
        self.state.lock().next_free_ticket_micros
    }

    fn sleep(&self, permits: u32, micros_to_wait: u64) {
        tracing::trace!(
            permits,
            wait_micros = micros_to_wait,
            "smooth_rate_limiter.reserved"
        );

        if micros_to_wait > 0 {
            self.ticker.sleep_micros_uninterruptibly(micros_to_wait);
        }
    }

    fn read_micros(&self) -> u64 {
        self.ticker.read().saturating_sub(self.offset_nanos) / NANOS_PER_MICRO
    }
} // end of impl

impl<T> std::fmt::Debug for SmoothRateLimiter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SmoothRateLimiter")
            .field(
                "permits_per_second",
                &(MICROS_PER_SECOND / state.stable_interval_micros),
            )
            .field("stored_permits", &state.stored_permits)
            .field("max_permits", &state.max_permits)
            .finish()
    }
}
