//! Layer 4: the semantic policy layer. Wires `PolicyConfig` onto a message:
//! method shape, tool contract, resource access, side effects/egress, and
//! (opt-in) method chaining, in that fixed order, first failure wins.
//!
//! One struct coordinates several sub-policy tables behind a single entry
//! point, running the five ordered checks in sequence.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::Value;
use warden_behavior::{QuotaLimits, QuotaProvider, SessionMemory};
use warden_proto::{Decision, Layer, LayerName, Message, Severity, ValidationContext, ViolationType, WardenError};

use crate::config::PolicyConfig;
use crate::resource::{self, ResourceFailure};
use crate::tool::{self, ToolFailure};

pub struct SemanticLayer {
    config: PolicyConfig,
    quota: Arc<QuotaProvider>,
    sessions: Mutex<SessionMemory<String, String>>,
}

impl SemanticLayer {
    #[must_use]
    pub fn new(config: PolicyConfig, quota: Arc<QuotaProvider>) -> Self {
        let sessions = Mutex::new(SessionMemory::new(config.max_sessions, config.session_ttl_ms));
        Self { config, quota, sessions }
    }

    fn block(&self, context: &ValidationContext, severity: Severity, violation: ViolationType, reason: impl Into<String>) -> Decision {
        Decision::block(self.name(), severity, violation, reason, 1.0, context.timestamp)
    }
}

impl Layer for SemanticLayer {
    fn name(&self) -> LayerName {
        "Layer4-Semantic"
    }

    fn validate(&self, message: &Message, context: &mut ValidationContext) -> Result<Decision, WardenError> {
        let now = context.timestamp;

        // Step 1: method shape.
        let Some(spec) = self.config.method_spec.get(&message.method) else {
            return Ok(self.block(
                context,
                Severity::Medium,
                ViolationType::InvalidMcpMethod,
                format!("method {:?} is not a known MCP method", message.method),
            ));
        };
        for required in &spec.required {
            let present = message.params.as_ref().and_then(|p| p.get(required)).is_some();
            if !present {
                return Ok(self.block(
                    context,
                    Severity::Medium,
                    ViolationType::MissingRequiredParam,
                    format!("method {:?} requires param `{required}`", message.method),
                ));
            }
        }

        // Step 2: tool-call contract.
        if message.method == "tools/call" {
            if let Some(decision) = self.check_tool_call(message, context, now)? {
                return Ok(decision);
            }
        }

        // Step 3: resource-read contract.
        if message.method == "resources/read" {
            if let Some(decision) = self.check_resource_read(message, context, now)? {
                return Ok(decision);
            }
        }

        // Step 5: optional method chaining.
        if self.config.enable_chaining {
            if let Some(decision) = self.check_chaining(message, context, now) {
                return Ok(decision);
            }
        }

        Ok(Decision::Pass)
    }
}

impl SemanticLayer {
    fn check_tool_call(&self, message: &Message, context: &ValidationContext, now: DateTime<Utc>) -> Result<Option<Decision>, WardenError> {
        let name = message.params.as_ref().and_then(|p| p.get("name")).and_then(Value::as_str).unwrap_or_default();
        let Some(tool) = self.config.tool_registry.get(name) else {
            return Ok(Some(self.block(
                context,
                Severity::High,
                ViolationType::ToolNotAllowed,
                format!("tool {name:?} is not in the tool registry"),
            )));
        };

        let arguments = message.params.as_ref().and_then(|p| p.get("arguments"));

        if let Some(failure) = tool::check_args_shape(tool, arguments) {
            return Ok(Some(match failure {
                ToolFailure::MissingParam(param) => self.block(
                    context,
                    Severity::High,
                    ViolationType::MissingRequiredParam,
                    format!("tool {name:?} requires argument `{param}`"),
                ),
                ToolFailure::InvalidArgType(param) => self.block(
                    context,
                    Severity::High,
                    ViolationType::InvalidToolArguments,
                    format!("argument `{param}` has the wrong type for tool {name:?}"),
                ),
                ToolFailure::ArgsTooLarge => self.block(
                    context,
                    Severity::Medium,
                    ViolationType::ArgsEgressLimit,
                    format!("serialized arguments for tool {name:?} exceed the size limit"),
                ),
                _ => unreachable!("check_args_shape only returns the above variants"),
            }));
        }

        let quota_key = format!("tool:{name}");
        let limits = QuotaLimits { minute: tool.quota_per_minute, hour: tool.quota_per_hour };
        if limits.minute.is_some() || limits.hour.is_some() {
            let check = self.quota.increment_and_check(&quota_key, limits, now);
            if !check.passed {
                return Ok(Some(self.block(
                    context,
                    Severity::High,
                    ViolationType::QuotaExceeded,
                    check.reason.unwrap_or_else(|| "tool quota exceeded".into()),
                )));
            }
        }

        // Step 4: side effects & egress, using the same tool/arguments pair.
        if let Some(failure) = tool::check_side_effects(tool, &context.policy, arguments) {
            return Ok(Some(match failure {
                ToolFailure::SideEffectNotAllowed => self.block(
                    context,
                    Severity::High,
                    ViolationType::SideEffectNotAllowed,
                    format!("tool {name:?} requires a capability not granted to this request"),
                ),
                ToolFailure::EgressTooLarge => self.block(
                    context,
                    Severity::Medium,
                    ViolationType::ToolEgressLimit,
                    format!("estimated egress for tool {name:?} exceeds its limit"),
                ),
                _ => unreachable!("check_side_effects only returns the above variants"),
            }));
        }

        Ok(None)
    }

    fn check_resource_read(&self, message: &Message, context: &ValidationContext, now: DateTime<Utc>) -> Result<Option<Decision>, WardenError> {
        let uri = message.params.as_ref().and_then(|p| p.get("uri")).and_then(Value::as_str).unwrap_or_default();
        let canonical_uri = warden_canon::canonicalize(uri);
        let base_dir = context.base_dir.as_deref();

        if let Some(failure) = resource::check(&canonical_uri, &self.config.resource_policy, base_dir) {
            return Ok(Some(match failure {
                ResourceFailure::Policy(reason) => self.block(context, Severity::High, ViolationType::ResourcePolicyViolation, reason),
                ResourceFailure::Egress(reason) => self.block(context, Severity::Medium, ViolationType::ResourceEgressLimit, reason),
            }));
        }

        let limits = QuotaLimits { minute: self.config.resource_policy.quota_per_minute, hour: self.config.resource_policy.quota_per_hour };
        if limits.minute.is_some() || limits.hour.is_some() {
            let check = self.quota.increment_and_check("method:resources/read", limits, now);
            if !check.passed {
                return Ok(Some(self.block(
                    context,
                    Severity::High,
                    ViolationType::QuotaExceeded,
                    check.reason.unwrap_or_else(|| "resources/read quota exceeded".into()),
                )));
            }
        }

        Ok(None)
    }

    fn check_chaining(&self, message: &Message, context: &ValidationContext, now: DateTime<Utc>) -> Option<Decision> {
        let session_key = context.session_key().to_string();
        let mut sessions = self.sessions.lock().expect("policy layer mutex poisoned");
        let prev = sessions.get(&session_key, now);

        if prev.is_some() {
            let allowed = self
                .config
                .chaining_rules
                .iter()
                .any(|rule| rule.matches(prev.as_deref(), &message.method));
            if !allowed {
                return Some(self.block(
                    context,
                    Severity::High,
                    ViolationType::ChainViolation,
                    format!("method {:?} may not follow {:?} in this session", message.method, prev),
                ));
            }
        }

        sessions.set(session_key, message.method.clone(), now);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warden_proto::SideEffectPolicy;

    fn ctx() -> ValidationContext {
        ValidationContext::new(Utc::now())
    }

    fn msg(method: &str, params: Option<Value>) -> Message {
        Message { jsonrpc: "2.0".into(), method: method.into(), id: Some(json!(1)), params }
    }

    fn layer() -> SemanticLayer {
        SemanticLayer::new(PolicyConfig::default(), QuotaProvider::new())
    }

    #[test]
    fn passes_a_known_tool_call() {
        let layer = layer();
        let m = msg("tools/call", Some(json!({"name": "debug-echo", "arguments": {"text": "hi"}})));
        assert!(layer.validate(&m, &mut ctx()).unwrap().is_pass());
    }

    #[test]
    fn unknown_method_is_medium_invalid_mcp_method() {
        let layer = layer();
        let m = msg("totally/unknown", None);
        match layer.validate(&m, &mut ctx()).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::InvalidMcpMethod),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn unregistered_tool_is_blocked() {
        let layer = layer();
        let m = msg("tools/call", Some(json!({"name": "rm-rf", "arguments": {}})));
        match layer.validate(&m, &mut ctx()).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::ToolNotAllowed),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn missing_tool_argument_is_blocked() {
        let layer = layer();
        let m = msg("tools/call", Some(json!({"name": "debug-file-reader", "arguments": {}})));
        match layer.validate(&m, &mut ctx()).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::MissingRequiredParam),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn write_tool_without_policy_flag_is_blocked() {
        let mut config = PolicyConfig::default();
        config.tool_registry.insert(
            "writer".into(),
            crate::types::ToolSpec::new("writer", crate::types::SideEffect::Write),
        );
        let layer = SemanticLayer::new(config, QuotaProvider::new());
        let mut c = ctx();
        c.policy = SideEffectPolicy { allow_network: false, allow_writes: false };
        let m = msg("tools/call", Some(json!({"name": "writer", "arguments": {}})));
        match layer.validate(&m, &mut c).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::SideEffectNotAllowed),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn chaining_disabled_by_default_allows_any_sequence() {
        let layer = layer();
        let mut c = ctx();
        c.session_id = Some("s1".into());
        layer.validate(&msg("tools/call", Some(json!({"name": "debug-echo", "arguments": {"text": "a"}}))), &mut c).unwrap();
        let second = layer.validate(&msg("resources/read", Some(json!({"uri": "file:///tmp/x"}))), &mut c).unwrap();
        assert!(second.is_pass());
    }

    #[test]
    fn chaining_enforced_when_enabled() {
        let mut config = PolicyConfig::default();
        config.enable_chaining = true;
        config.chaining_rules.push(crate::types::ChainingRule { from: "*".into(), to: "tools/call".into() });
        let layer = SemanticLayer::new(config, QuotaProvider::new());
        let mut c = ctx();
        c.session_id = Some("s1".into());
        layer.validate(&msg("tools/call", Some(json!({"name": "debug-echo", "arguments": {"text": "a"}}))), &mut c).unwrap();
        match layer.validate(&msg("resources/read", Some(json!({"uri": "file:///tmp/x"}))), &mut c).unwrap() {
            Decision::Block(o) => assert_eq!(o.violation, ViolationType::ChainViolation),
            Decision::Pass => panic!("expected chain violation"),
        }
    }
}
