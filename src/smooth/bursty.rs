use crate::MaxBurstSeconds;

/// Stored permits are free: idle time up to `max_burst_seconds` is handed out as an
/// immediate burst.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bursty {
    max_burst_seconds: f64,
}

impl Bursty {
    pub(crate) fn new(max_burst_seconds: MaxBurstSeconds) -> Self {
        Self {
            max_burst_seconds: *max_burst_seconds,
        }
    }

    /// Returns `(max_permits, stored_permits)` for the new rate.
    ///
    /// Stored permits keep their proportion of the capacity. A limiter with no previous
    /// capacity starts empty.
    pub(crate) fn apply_rate(
        &self,
        permits_per_second: f64,
        old_max_permits: f64,
        stored_permits: f64,
    ) -> (f64, f64) {
        let max_permits = self.max_burst_seconds * permits_per_second;

        let stored_permits = if old_max_permits == 0f64 {
            0f64
        } else {
            stored_permits * max_permits / old_max_permits
        };

        (max_permits, stored_permits)
    }

    pub(crate) fn stored_permits_to_wait_time(&self) -> u64 {
        0
    }
}
