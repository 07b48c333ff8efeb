use crate::WarmupPeriod;

const COLD_FACTOR: f64 = 3f64;

/// Stored permits mean the limiter is cold.
///
/// The capacity is `warmup_period / stable_interval`. Permits stored above half of it are
/// issued along a linear ramp: the permit at full capacity costs the cold interval
/// (`3 × stable_interval`) and the permit at half capacity costs the stable interval.
/// Below half capacity every permit costs the stable interval.
///
/// ```text
///            ^ wait per permit
///            |
///  cold      +                  /
///  interval  |                 /.
///            |                / .
///            |               /  .
///  stable    +--------------/   .
///  interval  |              .   .
///            |              .   .
///            0 -------------+---+--> stored permits
///                         half  max
/// ```
#[derive(Debug, Clone, Copy)]
pub(crate) struct WarmingUp {
    warmup_period_micros: f64,
    stable_interval_micros: f64,
    half_permits: f64,
    slope: f64,
}

impl WarmingUp {
    pub(crate) fn new(warmup_period: WarmupPeriod) -> Self {
        Self {
            warmup_period_micros: warmup_period.as_micros() as f64,
            stable_interval_micros: 0f64,
            half_permits: 0f64,
            slope: 0f64,
        }
    }

    /// Returns `(max_permits, stored_permits)` for the new stable interval.
    ///
    /// A limiter with no previous capacity starts fully cold.
    pub(crate) fn apply_rate(
        &mut self,
        stable_interval_micros: f64,
        old_max_permits: f64,
        stored_permits: f64,
    ) -> (f64, f64) {
        let max_permits = self.warmup_period_micros / stable_interval_micros;
        let cold_interval_micros = stable_interval_micros * COLD_FACTOR;

        self.stable_interval_micros = stable_interval_micros;
        self.half_permits = max_permits / 2f64;
        self.slope = (cold_interval_micros - stable_interval_micros) / self.half_permits;

        let stored_permits = if old_max_permits == 0f64 {
            max_permits
        } else {
            stored_permits * max_permits / old_max_permits
        };

        (max_permits, stored_permits)
    }

    /// Area under the ramp between `stored_permits - permits_to_take` and
    /// `stored_permits`, in microseconds.
    pub(crate) fn stored_permits_to_wait_time(
        &self,
        stored_permits: f64,
        mut permits_to_take: f64,
    ) -> u64 {
        let available_above_half = stored_permits - self.half_permits;
        let mut micros = 0u64;

        if available_above_half > 0f64 {
            let above_half_to_take = available_above_half.min(permits_to_take);

            micros = (above_half_to_take
                * (self.permits_to_time(available_above_half)
                    + self.permits_to_time(available_above_half - above_half_to_take))
                / 2f64) as u64;

            permits_to_take -= above_half_to_take;
        }

        micros.saturating_add((self.stable_interval_micros * permits_to_take) as u64)
    }

    fn permits_to_time(&self, permits: f64) -> f64 {
        self.stable_interval_micros + permits * self.slope
    }
}
