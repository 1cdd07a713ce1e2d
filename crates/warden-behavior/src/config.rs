//! Tunables for the behavior layer, the quota provider, and session memory.
//!
//! Defaults mirror the design exactly: a 60-request-per-minute,
//! 1000-per-hour global ceiling, an 8-events-in-10-seconds burst threshold
//! tracked over a 30-second ring, a 20 KB oversize cutoff, and a 5-minute
//! clock-skew tolerance on quota windows.

/// Clock-skew tolerance applied to every sliding window: a window is only
/// reset early if it has been stale for `window_ms + CLOCK_SKEW_MS`, and
/// swept away once stale for `2 * window_ms + CLOCK_SKEW_MS`.
pub(crate) const CLOCK_SKEW_MS: i64 = 5_000;

pub(crate) const MINUTE_MS: i64 = 60_000;
pub(crate) const HOUR_MS: i64 = 3_600_000;

#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Maximum requests per rolling minute across the whole process. `None`
    /// disables the check.
    pub per_minute_limit: Option<u64>,
    /// Maximum requests per rolling hour across the whole process.
    pub per_hour_limit: Option<u64>,
    /// Number of events within `burst_window_ms` that trips burst detection.
    pub burst_threshold: usize,
    /// Window, in milliseconds, burst detection counts over (10000).
    pub burst_window_ms: i64,
    /// How long an arrival timestamp stays in the burst ring before it is
    /// swept (30000 — strictly wider than `burst_window_ms`).
    pub burst_ring_ms: i64,
    /// Serialized message size, in bytes, above which a message is flagged
    /// as oversized (20000).
    pub oversize_bytes: usize,
    /// Mean inter-arrival interval, in milliseconds, that counts as
    /// "machine-paced" when combined with a low standard deviation.
    pub automated_timing_mean_range_ms: (f64, f64),
    /// Standard deviation, in milliseconds, below which inter-arrival timing
    /// is considered too regular to be a human.
    pub automated_timing_stddev_ms: f64,
    /// How often the background sweep runs (at least 60s).
    pub sweep_interval_secs: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            per_minute_limit: Some(60),
            per_hour_limit: Some(1_000),
            burst_threshold: 8,
            burst_window_ms: 10_000,
            burst_ring_ms: 30_000,
            oversize_bytes: 20_000,
            automated_timing_mean_range_ms: (100.0, 2000.0),
            automated_timing_stddev_ms: 50.0,
            sweep_interval_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = BehaviorConfig::default();
        assert_eq!(c.per_minute_limit, Some(60));
        assert_eq!(c.per_hour_limit, Some(1_000));
        assert_eq!(c.burst_threshold, 8);
        assert_eq!(c.oversize_bytes, 20_000);
        assert!(c.sweep_interval_secs >= 60);
    }
}
