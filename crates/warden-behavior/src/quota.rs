//! C5 — the keyed quota provider used by the semantic policy engine (L4) to
//! meter tool calls and resource reads independently of the global behavior
//! layer's own rate limiting.
//!
//! Uses a pre-check-then-consume budget pattern: a per-key counter pair
//! (minute + hour) stored in a sharded `DashMap` gives atomic per-key
//! increments without a global lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::config::{CLOCK_SKEW_MS, HOUR_MS, MINUTE_MS};
use crate::window::WindowCounter;

/// Per-call limits to check and increment against, either of which may be
/// absent to skip that window entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotaLimits {
    pub minute: Option<u64>,
    pub hour: Option<u64>,
}

/// Outcome of [`QuotaProvider::increment_and_check`].
#[derive(Debug, Clone)]
pub struct QuotaCheck {
    pub passed: bool,
    pub reason: Option<String>,
}

impl QuotaCheck {
    fn pass() -> Self {
        Self { passed: true, reason: None }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self { passed: false, reason: Some(reason.into()) }
    }
}

#[derive(Default)]
struct QuotaKeyState {
    minute: Option<WindowCounter>,
    hour: Option<WindowCounter>,
}

/// A sharded, in-memory quota counter keyed by an arbitrary string (the
/// semantic layer uses keys like `tool:{name}` and `resource:{host}`).
///
/// Increment is always applied — even when the resulting check fails — so
/// that a client hammering a blocked key keeps accumulating against its
/// quota rather than getting free retries.
pub struct QuotaProvider {
    counters: DashMap<String, QuotaKeyState>,
    stopped: Arc<AtomicBool>,
}

impl QuotaProvider {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            counters: DashMap::new(),
            stopped: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Increments both configured windows for `key` and reports whether
    /// either limit was exceeded. The minute window is checked first; if it
    /// fails the hour window is still incremented (both windows always
    /// observe the call) but its result does not override the minute
    /// failure's reason.
    pub fn increment_and_check(&self, key: &str, limits: QuotaLimits, now: DateTime<Utc>) -> QuotaCheck {
        let mut state = self.counters.entry(key.to_string()).or_default();
        let mut result = QuotaCheck::pass();

        if let Some(limit) = limits.minute {
            let counter = state.minute.get_or_insert_with(|| WindowCounter::new(now));
            let count = counter.increment(now, MINUTE_MS, CLOCK_SKEW_MS);
            if count > limit {
                result = QuotaCheck::fail(format!("per-minute quota exceeded for {key}: {count}/{limit}"));
            }
        }

        if let Some(limit) = limits.hour {
            let counter = state.hour.get_or_insert_with(|| WindowCounter::new(now));
            let count = counter.increment(now, HOUR_MS, CLOCK_SKEW_MS);
            if result.passed && count > limit {
                result = QuotaCheck::fail(format!("per-hour quota exceeded for {key}: {count}/{limit}"));
            }
        }

        result
    }

    /// Drops any per-key state whose windows have both gone stale. Cheap and
    /// non-blocking enough to call from a periodic background task.
    pub fn sweep(&self, now: DateTime<Utc>) {
        self.counters.retain(|_, state| {
            if let Some(c) = &state.minute {
                if c.is_stale(now, MINUTE_MS, CLOCK_SKEW_MS) {
                    state.minute = None;
                }
            }
            if let Some(c) = &state.hour {
                if c.is_stale(now, HOUR_MS, CLOCK_SKEW_MS) {
                    state.hour = None;
                }
            }
            state.minute.is_some() || state.hour.is_some()
        });
    }

    /// Spawns a periodic task that calls [`sweep`](Self::sweep) until
    /// [`destroy`](Self::destroy) is called.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if this.stopped.load(Ordering::Relaxed) {
                    break;
                }
                this.sweep(Utc::now());
            }
        })
    }

    /// Stops any running sweeper and drops all counter state. Idempotent.
    pub fn destroy(&self) {
        self.stopped.store(true, Ordering::Relaxed);
        self.counters.clear();
    }
}

impl Default for QuotaProvider {
    fn default() -> Self {
        Self {
            counters: DashMap::new(),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn passes_under_limit() {
        let q = QuotaProvider::default();
        let now = Utc::now();
        let limits = QuotaLimits { minute: Some(5), hour: None };
        for _ in 0..5 {
            assert!(q.increment_and_check("tool:echo", limits, now).passed);
        }
    }

    #[test]
    fn fails_over_limit_and_keeps_incrementing() {
        let q = QuotaProvider::default();
        let now = Utc::now();
        let limits = QuotaLimits { minute: Some(2), hour: None };
        assert!(q.increment_and_check("tool:echo", limits, now).passed);
        assert!(q.increment_and_check("tool:echo", limits, now).passed);
        let check = q.increment_and_check("tool:echo", limits, now);
        assert!(!check.passed);
        assert!(check.reason.unwrap().contains("per-minute"));
    }

    #[test]
    fn windows_reset_after_clock_skew_tolerance() {
        let q = QuotaProvider::default();
        let t0 = Utc::now();
        let limits = QuotaLimits { minute: Some(1), hour: None };
        assert!(q.increment_and_check("k", limits, t0).passed);
        assert!(!q.increment_and_check("k", limits, t0).passed);
        let later = t0 + Duration::milliseconds(MINUTE_MS + CLOCK_SKEW_MS + 1);
        assert!(q.increment_and_check("k", limits, later).passed);
    }

    #[test]
    fn sweep_drops_stale_keys() {
        let q = QuotaProvider::default();
        let t0 = Utc::now();
        let limits = QuotaLimits { minute: Some(10), hour: None };
        q.increment_and_check("k", limits, t0);
        assert_eq!(q.counters.len(), 1);
        let later = t0 + Duration::milliseconds(2 * MINUTE_MS + CLOCK_SKEW_MS + 1);
        q.sweep(later);
        assert_eq!(q.counters.len(), 0);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let q = QuotaProvider::default();
        let now = Utc::now();
        let limits = QuotaLimits { minute: Some(1), hour: None };
        assert!(q.increment_and_check("a", limits, now).passed);
        assert!(q.increment_and_check("b", limits, now).passed);
    }
}
