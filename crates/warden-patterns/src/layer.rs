//! Layer 2: content inspection.

use warden_canon::canonicalize;
use warden_proto::{Decision, Layer, LayerName, Message, ValidationContext, WardenError};

use crate::cache::CanonCache;
use crate::{catalog, css, dataurl};

/// The content layer: canonicalizes the message once, memoizes the result,
/// then runs the data-URI check, the CSS check, and the attack pattern
/// catalog in that order, stopping at the first match.
pub struct ContentLayer {
    cache: CanonCache,
}

impl ContentLayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: CanonCache::new(),
        }
    }
}

impl Default for ContentLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for ContentLayer {
    fn name(&self) -> LayerName {
        "Layer2-Content"
    }

    fn validate(&self, message: &Message, context: &mut ValidationContext) -> Result<Decision, WardenError> {
        let raw = message.to_json_string()?;
        let params_repr = message
            .params
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let canonical = self
            .cache
            .get_or_insert_with(&message.method, &params_repr, raw.len(), || canonicalize(&raw));
        context.set_canonical(canonical.clone());

        if let Some((violation, severity, reason, confidence)) = dataurl::scan(&canonical) {
            return Ok(Decision::block(self.name(), severity, violation, reason, confidence, context.timestamp));
        }
        if let Some((violation, severity, reason, confidence)) = css::scan(&canonical) {
            return Ok(Decision::block(self.name(), severity, violation, reason, confidence, context.timestamp));
        }
        for pattern in catalog::catalog() {
            if pattern.regex.is_match(&canonical) {
                let reason = format!("matched `{}` pattern in `{}` category", pattern.name, pattern.category);
                return Ok(Decision::block(
                    self.name(),
                    pattern.severity,
                    pattern.violation,
                    reason,
                    pattern.confidence,
                    context.timestamp,
                ));
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
    use warden_proto::ViolationType;

    fn ctx() -> ValidationContext {
        ValidationContext::new(Utc::now())
    }

    fn msg(method: &str, params: serde_json::Value) -> Message {
        Message {
            jsonrpc: "2.0".into(),
            method: method.into(),
            id: Some(json!(1)),
            params: Some(params),
        }
    }

    #[test]
    fn passes_benign_tool_call() {
        let layer = ContentLayer::new();
        let mut c = ctx();
        let m = msg("tools/call", json!({"name": "echo", "arguments": {"text": "hello"}}));
        let decision = layer.validate(&m, &mut c).unwrap();
        assert!(decision.is_pass());
        assert!(c.canonical.is_some());
    }

    #[test]
    fn blocks_path_traversal() {
        let layer = ContentLayer::new();
        let mut c = ctx();
        let m = msg(
            "resources/read",
            json!({"uri": "file://%252e%252e%252fetc%252fpasswd"}),
        );
        let decision = layer.validate(&m, &mut c).unwrap();
        match decision {
            Decision::Block(outcome) => assert_eq!(outcome.violation, ViolationType::PathTraversal),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn blocks_ssrf_metadata_target() {
        let layer = ContentLayer::new();
        let mut c = ctx();
        let m = msg("tools/call", json!({"name": "fetch", "arguments": {"url": "http://169.254.169.254/latest/meta-data/"}}));
        let decision = layer.validate(&m, &mut c).unwrap();
        match decision {
            Decision::Block(outcome) => assert_eq!(outcome.violation, ViolationType::SsrfAttempt),
            Decision::Pass => panic!("expected block"),
        }
    }

    #[test]
    fn memoizes_canonical_form_across_identical_calls() {
        let layer = ContentLayer::new();
        let mut c1 = ctx();
        let mut c2 = ctx();
        let m = msg("tools/call", json!({"name": "echo", "arguments": {"text": "hi"}}));
        layer.validate(&m, &mut c1).unwrap();
        layer.validate(&m, &mut c2).unwrap();
        assert_eq!(c1.canonical, c2.canonical);
    }
}
