//! Layer 3: behavior — rate, burst, size, timing, and probing heuristics.
//!
//! Unlike the content and structure layers, this layer is stateful and
//! scoped to the whole process, per-process and single-scope rather than
//! per-session — a client cannot dodge rate limiting by rotating
//! session ids. State lives behind `std::sync::Mutex`es sized for the brief,
//! CPU-bound critical sections `Layer::validate` requires (no `.await`
//! while holding one).

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use warden_proto::{Decision, Layer, LayerName, Message, Severity, ValidationContext, ViolationType, WardenError};

use crate::config::{BehaviorConfig, CLOCK_SKEW_MS, HOUR_MS, MINUTE_MS};
use crate::probing::looks_like_probing;
use crate::window::WindowCounter;

/// How many inter-arrival intervals the automated-timing heuristic looks
/// at ("last 5 intervals", which needs 6 timestamps).
const TIMING_SAMPLE_ARRIVALS: usize = 6;

pub struct BehaviorLayer {
    config: BehaviorConfig,
    minute_counter: Mutex<WindowCounter>,
    hour_counter: Mutex<WindowCounter>,
    burst_ring: Mutex<VecDeque<DateTime<Utc>>>,
    arrivals: Mutex<VecDeque<DateTime<Utc>>>,
}

impl BehaviorLayer {
    #[must_use]
    pub fn new(config: BehaviorConfig) -> Self {
        let now = Utc::now();
        Self {
            minute_counter: Mutex::new(WindowCounter::new(now)),
            hour_counter: Mutex::new(WindowCounter::new(now)),
            burst_ring: Mutex::new(VecDeque::new()),
            arrivals: Mutex::new(VecDeque::new()),
            config,
        }
    }

    fn block(&self, context: &ValidationContext, severity: Severity, violation: ViolationType, reason: impl Into<String>) -> Decision {
        Decision::block(self.name(), severity, violation, reason, 1.0, context.timestamp)
    }

    /// Drops ring/arrival entries and rate counters old enough that they can
    /// no longer affect a decision, bounding this layer's memory use over a
    /// long-running process. Safe to call from a periodic background task;
    /// does not block on anything but its own mutexes.
    pub fn sweep(&self, now: DateTime<Utc>) {
        const RING_TTL_MS: i64 = 3_600_000; // 1h
        const COUNTER_TTL_MS: i64 = 7_200_000; // 2h

        if let Ok(mut ring) = self.burst_ring.lock() {
            while matches!(ring.front(), Some(t) if (now - *t).num_milliseconds() > RING_TTL_MS) {
                ring.pop_front();
            }
        }
        if let Ok(mut arrivals) = self.arrivals.lock() {
            while matches!(arrivals.front(), Some(t) if (now - *t).num_milliseconds() > RING_TTL_MS) {
                arrivals.pop_front();
            }
        }
        // `is_stale` tests `elapsed > 2*window_ms + clock_skew_ms`; pass the
        // skew term needed to make that threshold land on exactly COUNTER_TTL_MS.
        if let Ok(mut m) = self.minute_counter.lock() {
            if m.is_stale(now, MINUTE_MS, COUNTER_TTL_MS - 2 * MINUTE_MS) {
                *m = WindowCounter::new(now);
            }
        }
        if let Ok(mut h) = self.hour_counter.lock() {
            if h.is_stale(now, HOUR_MS, COUNTER_TTL_MS - 2 * HOUR_MS) {
                *h = WindowCounter::new(now);
            }
        }
    }

    /// Spawns a periodic task calling [`sweep`](Self::sweep). The caller
    /// owns the returned handle and is responsible for aborting it on
    /// shutdown — this layer has no `destroy()` of its own since, unlike the
    /// quota provider, it is not expected to be torn down mid-process.
    pub fn spawn_sweeper(self: std::sync::Arc<Self>, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.sweep(Utc::now());
            }
        })
    }
}

impl Default for BehaviorLayer {
    fn default() -> Self {
        Self::new(BehaviorConfig::default())
    }
}

impl Layer for BehaviorLayer {
    fn name(&self) -> LayerName {
        "Layer3-Behavior"
    }

    fn validate(&self, message: &Message, context: &mut ValidationContext) -> Result<Decision, WardenError> {
        let now = context.timestamp;

        if let Some(limit) = self.config.per_minute_limit {
            let count = self
                .minute_counter
                .lock()
                .expect("behavior layer mutex poisoned")
                .increment(now, MINUTE_MS, CLOCK_SKEW_MS);
            if count > limit {
                return Ok(self.block(
                    context,
                    Severity::High,
                    ViolationType::RateLimitExceeded,
                    format!("per-minute rate limit exceeded: {count}/{limit}"),
                ));
            }
        }

        if let Some(limit) = self.config.per_hour_limit {
            let count = self
                .hour_counter
                .lock()
                .expect("behavior layer mutex poisoned")
                .increment(now, HOUR_MS, CLOCK_SKEW_MS);
            if count > limit {
                return Ok(self.block(
                    context,
                    Severity::High,
                    ViolationType::RateLimitExceeded,
                    format!("per-hour rate limit exceeded: {count}/{limit}"),
                ));
            }
        }

        if let Some(decision) = self.check_burst(now, context) {
            return Ok(decision);
        }

        let raw = message.to_json_string()?;
        if raw.len() > self.config.oversize_bytes {
            return Ok(self.block(
                context,
                Severity::Medium,
                ViolationType::OversizedMessage,
                format!("message is {} bytes (max {})", raw.len(), self.config.oversize_bytes),
            ));
        }

        if let Some(decision) = self.check_automated_timing(now, context) {
            return Ok(decision);
        }

        if looks_like_probing(&message.method) {
            return Ok(self.block(
                context,
                Severity::Low,
                ViolationType::SuspiciousMethod,
                format!("method {:?} matches a reconnaissance-probing pattern", message.method),
            ));
        }

        Ok(Decision::Pass)
    }
}

impl BehaviorLayer {
    fn check_burst(&self, now: DateTime<Utc>, context: &ValidationContext) -> Option<Decision> {
        let mut ring = self.burst_ring.lock().expect("behavior layer mutex poisoned");
        while matches!(ring.front(), Some(t) if (now - *t).num_milliseconds() > self.config.burst_ring_ms) {
            ring.pop_front();
        }
        ring.push_back(now);
        let recent = ring.iter().filter(|t| (now - **t).num_milliseconds() <= self.config.burst_window_ms).count();
        (recent > self.config.burst_threshold).then(|| {
            self.block(
                context,
                Severity::High,
                ViolationType::BurstActivity,
                format!(
                    "{recent} messages within {}ms (threshold {})",
                    self.config.burst_window_ms, self.config.burst_threshold
                ),
            )
        })
    }

    fn check_automated_timing(&self, now: DateTime<Utc>, context: &ValidationContext) -> Option<Decision> {
        let mut arrivals = self.arrivals.lock().expect("behavior layer mutex poisoned");
        arrivals.push_back(now);
        while arrivals.len() > TIMING_SAMPLE_ARRIVALS {
            arrivals.pop_front();
        }
        if arrivals.len() < TIMING_SAMPLE_ARRIVALS {
            return None;
        }

        let intervals: Vec<f64> = arrivals
            .iter()
            .zip(arrivals.iter().skip(1))
            .map(|(a, b)| (*b - *a).num_milliseconds() as f64)
            .collect();
        let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
        let variance = intervals.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
        let stddev = variance.sqrt();

        let (lo, hi) = self.config.automated_timing_mean_range_ms;
        let looks_automated = mean >= lo && mean <= hi && stddev < self.config.automated_timing_stddev_ms;

        looks_automated.then(|| {
            self.block(
                context,
                Severity::Medium,
                ViolationType::AutomatedTiming,
                format!("inter-arrival timing is machine-regular (mean {mean:.1}ms, stddev {stddev:.1}ms)"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn msg(method: &str) -> Message {
        Message {
            jsonrpc: "2.0".into(),
            method: method.into(),
            id: Some(json!(1)),
            params: Some(json!({"name": "echo"})),
        }
    }

    fn ctx(now: DateTime<Utc>) -> ValidationContext {
        ValidationContext::new(now)
    }

    #[test]
    fn passes_a_single_benign_call() {
        let layer = BehaviorLayer::default();
        let mut c = ctx(Utc::now());
        assert!(layer.validate(&msg("tools/call"), &mut c).unwrap().is_pass());
    }

    #[test]
    fn blocks_after_per_minute_limit_exceeded() {
        let layer = BehaviorLayer::new(BehaviorConfig {
            per_minute_limit: Some(2),
            per_hour_limit: None,
            ..BehaviorConfig::default()
        });
        let now = Utc::now();
        layer.validate(&msg("tools/call"), &mut ctx(now)).unwrap();
        layer.validate(&msg("tools/call"), &mut ctx(now)).unwrap();
        match layer.validate(&msg("tools/call"), &mut ctx(now)).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::RateLimitExceeded),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn blocks_burst_activity() {
        let layer = BehaviorLayer::new(BehaviorConfig {
            per_minute_limit: None,
            per_hour_limit: None,
            burst_threshold: 3,
            ..BehaviorConfig::default()
        });
        let now = Utc::now();
        for _ in 0..3 {
            assert!(layer.validate(&msg("tools/call"), &mut ctx(now)).unwrap().is_pass());
        }
        match layer.validate(&msg("tools/call"), &mut ctx(now)).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::BurstActivity),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn blocks_oversized_message() {
        let layer = BehaviorLayer::new(BehaviorConfig {
            per_minute_limit: None,
            per_hour_limit: None,
            oversize_bytes: 50,
            ..BehaviorConfig::default()
        });
        let big = "x".repeat(200);
        let m = Message {
            jsonrpc: "2.0".into(),
            method: "tools/call".into(),
            id: Some(json!(1)),
            params: Some(json!({"name": "echo", "arguments": {"text": big}})),
        };
        match layer.validate(&m, &mut ctx(Utc::now())).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::OversizedMessage),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn blocks_machine_regular_timing() {
        let layer = BehaviorLayer::new(BehaviorConfig {
            per_minute_limit: None,
            per_hour_limit: None,
            burst_threshold: 1000,
            ..BehaviorConfig::default()
        });
        let t0 = Utc::now();
        for i in 0..6 {
            let t = t0 + Duration::milliseconds(i * 500);
            let decision = layer.validate(&msg("tools/call"), &mut ctx(t)).unwrap();
            if i == 5 {
                match decision {
                    Decision::Block(o) => assert_eq!(o.violation, ViolationType::AutomatedTiming),
                    Decision::Pass => panic!("expected block on the 6th evenly-spaced arrival"),
                }
            }
        }
    }

    #[test]
    fn blocks_probing_method_name() {
        let layer = BehaviorLayer::new(BehaviorConfig {
            per_minute_limit: None,
            per_hour_limit: None,
            burst_threshold: 1000,
            ..BehaviorConfig::default()
        });
        match layer.validate(&msg("probe/internal_state"), &mut ctx(Utc::now())).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::SuspiciousMethod),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn sweep_clears_old_ring_entries() {
        let layer = BehaviorLayer::default();
        let t0 = Utc::now();
        layer.validate(&msg("tools/call"), &mut ctx(t0)).unwrap();
        assert_eq!(layer.burst_ring.lock().unwrap().len(), 1);
        layer.sweep(t0 + Duration::milliseconds(3_600_001));
        assert_eq!(layer.burst_ring.lock().unwrap().len(), 0);
    }
}
