//! Smoothed token-bucket rate limiting.
//!
//! [`SmoothRateLimiter`] issues permits at a steady rate and blocks callers, through its
//! [`SleepingTicker`](crate::SleepingTicker), for exactly the shortfall between "now" and
//! the instant the next permit becomes available.
//!
//! # Key Characteristics
//!
//! - **Pay forward:** a request is granted as soon as the previously reserved permits
//!   are due; the permits it takes push the next request back. A fresh limiter never
//!   blocks on its first acquisition.
//! - **Lazy replenishment:** stored permits are only recomputed at acquisition time,
//!   from the ticker's elapsed time, and clamped to the capacity.
//! - **Thread-safe:** every reservation runs under one mutex, so permits are never
//!   double-granted. The sleep itself happens outside the lock.
//! - **Process-scoped:** nothing is shared across processes or persisted.
//!
//! # Strategies
//!
//! - [`SmoothingMode::Bursty`](crate::SmoothingMode::Bursty): idle time is banked (up
//!   to `max_burst_seconds`) and spent without waiting.
//! - [`SmoothingMode::WarmingUp`](crate::SmoothingMode::WarmingUp): idle time makes the
//!   limiter cold; it then ramps up from a third of the rate to the full rate over the
//!   warm-up period.

mod bursty;
mod warming_up;

mod smooth_rate_limiter;
pub use smooth_rate_limiter::*;
