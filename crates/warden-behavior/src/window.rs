//! A single sliding-window counter, shared by the quota provider (per-key,
//! one per `DashMap` entry) and the behavior layer (global, one per scope).
//!
//! A counter is checked against a limit before being trusted, and a stale
//! counter resets rather than accumulating forever.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowCounter {
    pub(crate) count: u64,
    pub(crate) window_start: DateTime<Utc>,
}

impl WindowCounter {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self { count: 0, window_start: now }
    }

    /// Rolls the window forward if it has gone stale, then increments and
    /// returns the post-increment count.
    pub(crate) fn increment(&mut self, now: DateTime<Utc>, window_ms: i64, clock_skew_ms: i64) -> u64 {
        if elapsed_ms(self.window_start, now) > window_ms + clock_skew_ms {
            self.count = 0;
            self.window_start = now;
        }
        self.count += 1;
        self.count
    }

    /// Whether this counter is old enough to be dropped by a sweep.
    pub(crate) fn is_stale(&self, now: DateTime<Utc>, window_ms: i64, clock_skew_ms: i64) -> bool {
        elapsed_ms(self.window_start, now) > 2 * window_ms + clock_skew_ms
    }
}

fn elapsed_ms(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn increments_within_window() {
        let t0 = Utc::now();
        let mut w = WindowCounter::new(t0);
        assert_eq!(w.increment(t0, MINUTE_MS, 0), 1);
        assert_eq!(w.increment(t0 + Duration::milliseconds(100), MINUTE_MS, 0), 2);
    }

    #[test]
    fn resets_after_window_plus_skew_elapses() {
        let t0 = Utc::now();
        let mut w = WindowCounter::new(t0);
        w.increment(t0, MINUTE_MS, 0);
        w.increment(t0, MINUTE_MS, 0);
        let later = t0 + Duration::milliseconds(MINUTE_MS + 1);
        assert_eq!(w.increment(later, MINUTE_MS, 0), 1);
    }

    #[test]
    fn stale_after_two_windows_plus_skew() {
        let t0 = Utc::now();
        let w = WindowCounter::new(t0);
        assert!(!w.is_stale(t0 + Duration::milliseconds(MINUTE_MS), MINUTE_MS, 0));
        assert!(w.is_stale(t0 + Duration::milliseconds(2 * MINUTE_MS + 1), MINUTE_MS, 0));
    }

    const MINUTE_MS: i64 = 60_000;
}
