//! The validation pipeline itself (C10): an ordered list of enabled layers,
//! run in sequence, short-circuiting on the first block. Numbered phases,
//! each able to short-circuit, with a fail-closed layer exception policy,
//! over an arbitrary ordered `Vec<Box<dyn Layer>>`.

use warden_proto::{Decision, Layer, Message, Severity, ValidationContext, ViolationType};

use crate::record::DecisionRecord;

/// Runs every enabled layer over a message in registration order.
///
/// # State machine
///
/// `{READY} -> [layer 0] -> (blocked|ok) -> [layer 1] -> ... ->
/// {ALLOWED|BLOCKED|INTERNAL_ERROR}`. Terminal in exactly one step per
/// message: the first `Decision::Block` (or layer `Err`) ends evaluation.
pub struct Pipeline {
    layers: Vec<Box<dyn Layer>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Self {
        Self { layers }
    }

    /// Runs the pipeline over `message`, returning the terminal decision.
    /// Never returns `Err` — a layer that raises one is converted into a
    /// CRITICAL `ValidationError` block, propagation policy.
    pub fn validate(&self, message: &Message, context: &mut ValidationContext) -> Decision {
        let message_size = message.to_json_string().map(|s| s.len()).unwrap_or(0);

        for layer in &self.layers {
            if !layer.enabled() {
                continue;
            }
            match layer.validate(message, context) {
                Ok(Decision::Pass) => continue,
                Ok(Decision::Block(outcome)) => {
                    DecisionRecord::block(
                        message,
                        message_size,
                        outcome.layer_name,
                        outcome.severity,
                        outcome.violation,
                        outcome.reason.clone(),
                        outcome.timestamp,
                    )
                    .emit();
                    return Decision::Block(outcome);
                }
                Err(err) => {
                    let redacted = warden_sanitizer::redact(Some(&err.to_string()), 500);
                    let decision = Decision::block(
                        layer.name(),
                        Severity::Critical,
                        ViolationType::ValidationError,
                        redacted.clone(),
                        1.0,
                        context.timestamp,
                    );
                    DecisionRecord::block(
                        message,
                        message_size,
                        layer.name(),
                        Severity::Critical,
                        ViolationType::ValidationError,
                        redacted,
                        context.timestamp,
                    )
                    .emit();
                    return decision;
                }
            }
        }

        DecisionRecord::allow(message, message_size, context.timestamp).emit();
        Decision::Pass
    }

    #[must_use]
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }
}
