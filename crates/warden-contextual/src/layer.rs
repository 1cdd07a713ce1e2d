//! Layer 5: the optional, host-extensible contextual layer.
//!
//! Grounded on `warden-policy`'s `SemanticLayer` for the "collection of
//! ordered checks behind one `Layer` impl" shape, generalized from a fixed
//! set of built-in checks to host-registered closures plus a TTL store.

use serde_json::Value;
use warden_proto::{Decision, Layer, LayerName, Message, Severity, ValidationContext, ViolationType, WardenError};

use std::sync::Mutex;

use crate::store::ContextStore;
use crate::validators::{GlobalRule, RequestValidator, ResponseValidator, ResponseValidatorFn, ValidatorFn, ValidatorOptions};

/// The L5 contextual layer. Safe to share across connections: every mutable
/// collection is behind its own mutex, matching `SessionMemory`'s own
/// single-writer-per-key discipline one level up.
pub struct ContextualLayer {
    global_rules: Mutex<Vec<GlobalRule>>,
    request_validators: Mutex<Vec<RequestValidator>>,
    response_validators: Mutex<Vec<ResponseValidator>>,
    store: ContextStore,
}

impl ContextualLayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            global_rules: Mutex::new(Vec::new()),
            request_validators: Mutex::new(Vec::new()),
            response_validators: Mutex::new(Vec::new()),
            store: ContextStore::new(),
        }
    }

    /// Registers an unordered global rule, evaluated before any request
    /// validator. A thrown error is always swallowed and logged — global
    /// rules have no `failOnError` opt-in.
    pub fn add_global_rule(&self, f: Box<ValidatorFn>, enabled: bool) {
        self.global_rules.lock().expect("contextual layer mutex poisoned").push(GlobalRule { f, enabled });
    }

    /// Registers a request validator, keeping the collection sorted by
    /// ascending priority so `validate` never has to sort at call time.
    pub fn add_validator(&self, name: impl Into<String>, f: Box<ValidatorFn>, options: ValidatorOptions) {
        let mut validators = self.request_validators.lock().expect("contextual layer mutex poisoned");
        let entry = RequestValidator { name: name.into(), f, options };
        let pos = validators.partition_point(|v| v.options.priority <= entry.options.priority);
        validators.insert(pos, entry);
    }

    pub fn add_response_validator(&self, name: impl Into<String>, f: Box<ResponseValidatorFn>, enabled: bool) {
        self.response_validators
            .lock()
            .expect("contextual layer mutex poisoned")
            .push(ResponseValidator { name: name.into(), f, enabled });
    }

    pub fn set_context(&self, key: impl Into<String>, value: Value, ttl_ms: i64, now: chrono::DateTime<chrono::Utc>) {
        self.store.set_context(key, value, ttl_ms, now);
    }

    #[must_use]
    pub fn get_context(&self, key: &str, now: chrono::DateTime<chrono::Utc>) -> Option<Value> {
        self.store.get_context(key, now)
    }

    /// Validates outbound content the same way `validate` validates inbound
    /// messages: global rules are not re-run, but response validators are,
    /// in registration order.
    pub fn validate_response(
        &self,
        response: &Value,
        request: &Message,
        context: &ValidationContext,
    ) -> Result<Decision, WardenError> {
        let validators = self.response_validators.lock().expect("contextual layer mutex poisoned");
        for validator in validators.iter().filter(|v| v.enabled) {
            match (validator.f)(response, request, context) {
                Ok(Decision::Block(outcome)) => return Ok(Decision::Block(outcome)),
                Ok(Decision::Pass) => {}
                Err(err) => {
                    tracing::warn!(validator = %validator.name, error = %err, "response validator threw; treating as pass");
                }
            }
        }
        Ok(Decision::Pass)
    }
}

impl Default for ContextualLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for ContextualLayer {
    fn name(&self) -> LayerName {
        "Layer5-Contextual"
    }

    fn validate(&self, message: &Message, context: &mut ValidationContext) -> Result<Decision, WardenError> {
        let global_rules = self.global_rules.lock().expect("contextual layer mutex poisoned");
        for rule in global_rules.iter().filter(|r| r.enabled) {
            match (rule.f)(message, context) {
                Ok(Decision::Block(outcome)) => return Ok(Decision::Block(outcome)),
                Ok(Decision::Pass) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "global rule threw; treating as pass");
                }
            }
        }
        drop(global_rules);

        let validators = self.request_validators.lock().expect("contextual layer mutex poisoned");
        for validator in validators.iter().filter(|v| v.options.enabled) {
            match (validator.f)(message, context) {
                Ok(Decision::Block(outcome)) => return Ok(Decision::Block(outcome)),
                Ok(Decision::Pass) => {
                    if validator.options.skip_on_success {
                        return Ok(Decision::Pass);
                    }
                }
                Err(err) => {
                    if validator.options.fail_on_error {
                        return Ok(Decision::block(
                            self.name(),
                            Severity::Medium,
                            ViolationType::ValidatorError,
                            format!("validator `{}` failed: {err}", validator.name),
                            1.0,
                            context.timestamp,
                        ));
                    }
                    tracing::warn!(validator = %validator.name, error = %err, "request validator threw; treating as pass");
                }
            }
        }

        Ok(Decision::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn msg() -> Message {
        Message { jsonrpc: "2.0".into(), method: "tools/call".into(), id: Some(json!(1)), params: None }
    }

    #[test]
    fn passes_with_no_validators_registered() {
        let layer = ContextualLayer::new();
        let mut ctx = ValidationContext::new(Utc::now());
        assert!(layer.validate(&msg(), &mut ctx).unwrap().is_pass());
    }

    #[test]
    fn disabled_validator_is_skipped() {
        let layer = ContextualLayer::new();
        layer.add_validator(
            "always-block",
            Box::new(|_, ctx| {
                Ok(Decision::block("Layer5-Contextual", Severity::High, ViolationType::ChainViolation, "no", 1.0, ctx.timestamp))
            }),
            ValidatorOptions { enabled: false, ..ValidatorOptions::default() },
        );
        let mut ctx = ValidationContext::new(Utc::now());
        assert!(layer.validate(&msg(), &mut ctx).unwrap().is_pass());
    }

    #[test]
    fn lower_priority_runs_first_and_can_short_circuit() {
        let layer = ContextualLayer::new();
        layer.add_validator(
            "second",
            Box::new(|_, ctx| {
                Ok(Decision::block("Layer5-Contextual", Severity::Low, ViolationType::Unknown, "second ran", 1.0, ctx.timestamp))
            }),
            ValidatorOptions { priority: 10, ..ValidatorOptions::default() },
        );
        layer.add_validator(
            "first",
            Box::new(|_, ctx| {
                Ok(Decision::block("Layer5-Contextual", Severity::High, ViolationType::ChainViolation, "first ran", 1.0, ctx.timestamp))
            }),
            ValidatorOptions { priority: 1, ..ValidatorOptions::default() },
        );
        let mut ctx = ValidationContext::new(Utc::now());
        match layer.validate(&msg(), &mut ctx).unwrap() {
            Decision::Block(o) => assert_eq!(o.reason, "first ran"),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn thrown_error_is_swallowed_unless_fail_on_error() {
        let layer = ContextualLayer::new();
        layer.add_validator(
            "throws",
            Box::new(|_, _| Err(WardenError::Internal("boom".into()))),
            ValidatorOptions::default(),
        );
        let mut ctx = ValidationContext::new(Utc::now());
        assert!(layer.validate(&msg(), &mut ctx).unwrap().is_pass());
    }

    #[test]
    fn fail_on_error_opt_in_produces_validator_error() {
        let layer = ContextualLayer::new();
        layer.add_validator(
            "throws",
            Box::new(|_, _| Err(WardenError::Internal("boom".into()))),
            ValidatorOptions { fail_on_error: true, ..ValidatorOptions::default() },
        );
        let mut ctx = ValidationContext::new(Utc::now());
        match layer.validate(&msg(), &mut ctx).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::ValidatorError),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn skip_on_success_stops_remaining_validators() {
        let layer = ContextualLayer::new();
        layer.add_validator("fast-accept", Box::new(|_, _| Ok(Decision::Pass)), ValidatorOptions {
            priority: 0,
            skip_on_success: true,
            ..ValidatorOptions::default()
        });
        layer.add_validator(
            "would-block",
            Box::new(|_, ctx| {
                Ok(Decision::block("Layer5-Contextual", Severity::High, ViolationType::ChainViolation, "no", 1.0, ctx.timestamp))
            }),
            ValidatorOptions { priority: 1, ..ValidatorOptions::default() },
        );
        let mut ctx = ValidationContext::new(Utc::now());
        assert!(layer.validate(&msg(), &mut ctx).unwrap().is_pass());
    }

    #[test]
    fn context_store_round_trips_through_the_layer() {
        let layer = ContextualLayer::new();
        let now = Utc::now();
        layer.set_context("session:s1", json!({"hits": 1}), 60_000, now);
        assert_eq!(layer.get_context("session:s1", now), Some(json!({"hits": 1})));
    }
}
