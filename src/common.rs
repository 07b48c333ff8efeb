use std::{ops::Deref, time::Duration};

use crate::TicklimitError;

/// A validated newtype for the steady rate, in permits per second.
///
/// Must be finite and greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PermitsPerSecond(f64);

impl Deref for PermitsPerSecond {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<f64> for PermitsPerSecond {
    type Error = TicklimitError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && value > 0f64 {
            Ok(Self(value))
        } else {
            Err(TicklimitError::InvalidConfiguration(
                "Permits per second must be greater than 0".to_string(),
            ))
        }
    }
}

/// How many seconds worth of permits a bursty limiter may bank while idle.
///
/// Burst capacity is `max_burst_seconds * permits_per_second`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MaxBurstSeconds(f64);

impl Default for MaxBurstSeconds {
    /// Returns a burst of 1 second.
    fn default() -> Self {
        Self(1f64)
    }
}

impl Deref for MaxBurstSeconds {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<f64> for MaxBurstSeconds {
    type Error = TicklimitError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && value > 0f64 {
            Ok(Self(value))
        } else {
            Err(TicklimitError::InvalidConfiguration(
                "Max burst seconds must be greater than 0".to_string(),
            ))
        }
    }
}

/// Time a warming-up limiter needs to go from cold to its stable rate.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct WarmupPeriod(Duration);

impl Deref for WarmupPeriod {
    type Target = Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Duration> for WarmupPeriod {
    type Error = TicklimitError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        if value.is_zero() {
            Err(TicklimitError::InvalidConfiguration(
                "Warmup period must be greater than 0".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Number of permits requested by a single acquisition. At least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permits(u32);

impl Default for Permits {
    /// Returns a single permit.
    fn default() -> Self {
        Self(1)
    }
}

impl Deref for Permits {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u32> for Permits {
    type Error = TicklimitError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(TicklimitError::InvalidPermits(
                "Requested permits must be at least 1".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Smoothing strategy used by [`SmoothRateLimiter`](crate::SmoothRateLimiter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingMode {
    /// Idle time is banked as stored permits (up to the burst capacity) and handed out
    /// without any wait.
    Bursty {
        /// Seconds worth of permits that may be banked.
        max_burst_seconds: MaxBurstSeconds,
    },
    /// Stored permits represent a "cold" limiter: they are handed out slowly at first and
    /// progressively faster until the stable rate is reached.
    WarmingUp {
        /// Time needed to go from fully cold to the stable rate.
        warmup_period: WarmupPeriod,
    },
}

impl Default for SmoothingMode {
    fn default() -> Self {
        Self::Bursty {
            max_burst_seconds: MaxBurstSeconds::default(),
        }
    }
}

/// Configuration for [`SmoothRateLimiter`](crate::SmoothRateLimiter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothRateLimiterOptions {
    /// Steady rate at which permits are issued.
    pub permits_per_second: PermitsPerSecond,
    /// How idle time is converted into stored permits.
    pub mode: SmoothingMode,
}
