#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod rate_limiter;
pub use rate_limiter::*;

mod smooth;
pub use smooth::*;

mod ticker;
pub use ticker::*;

mod error;
pub use error::*;

mod common;
pub use common::{
    MaxBurstSeconds, Permits, PermitsPerSecond, SmoothRateLimiterOptions, SmoothingMode,
    WarmupPeriod,
};

#[cfg(test)]
mod tests;
