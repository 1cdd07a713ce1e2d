//! Layer 1: JSON-RPC structural hygiene.

use serde_json::Value;
use warden_proto::{Decision, Layer, LayerName, Message, Severity, ValidationContext, ViolationType, WardenError};

use crate::config::StructureConfig;
use crate::methods;

/// Code points that are invisible or directionality-altering and have no
/// legitimate place in a JSON-RPC method call — distinct from L2's full
/// canonicalization, this is a cheap presence check, not a fold.
const DANGEROUS_INVISIBLE: &[char] = &[
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{202E}', '\u{202D}',
];

/// The structure layer: schema, size, encoding hygiene, and per-method
/// required-field checks, run in a fixed order. First failure wins.
pub struct StructureLayer {
    config: StructureConfig,
}

impl StructureLayer {
    #[must_use]
    pub fn new(config: StructureConfig) -> Self {
        Self { config }
    }

    fn block(
        &self,
        context: &ValidationContext,
        severity: Severity,
        violation: ViolationType,
        reason: impl Into<String>,
    ) -> Decision {
        Decision::block(self.name(), severity, violation, reason, 1.0, context.timestamp)
    }
}

impl Default for StructureLayer {
    fn default() -> Self {
        Self::new(StructureConfig::default())
    }
}

impl Layer for StructureLayer {
    fn name(&self) -> LayerName {
        "Layer1-Structure"
    }

    fn validate(&self, message: &Message, context: &mut ValidationContext) -> Result<Decision, WardenError> {
        if message.jsonrpc != "2.0" {
            return Ok(self.block(
                context,
                Severity::Critical,
                ViolationType::InvalidProtocol,
                format!("jsonrpc must be \"2.0\", got {:?}", message.jsonrpc),
            ));
        }

        if !is_valid_method_syntax(&message.method) {
            return Ok(self.block(
                context,
                Severity::High,
                ViolationType::InvalidMethod,
                format!("method {:?} fails shape/length check", message.method),
            ));
        }

        if let Some(id) = &message.id {
            if !matches!(id, Value::String(_) | Value::Number(_) | Value::Null) {
                return Ok(self.block(
                    context,
                    Severity::High,
                    ViolationType::MalformedMessage,
                    "id must be a string, number, or null",
                ));
            }
        }

        // Scan the *logical* text content (method name plus every string leaf
        // in params) rather than the serialized JSON, since serde_json
        // escapes control characters into `\u00XX` sequences — a literal
        // scan of the wire bytes would never see a raw control character at
        // all, escaped or not, defeating the point of the check.
        let text = collect_text(message);

        if text.contains('\0') {
            return Ok(self.block(
                context,
                Severity::Critical,
                ViolationType::DangerousEncoding,
                "message contains a null byte",
            ));
        }
        if text.chars().any(|c| DANGEROUS_INVISIBLE.contains(&c)) {
            return Ok(self.block(
                context,
                Severity::High,
                ViolationType::DangerousEncoding,
                "message contains dangerous invisible unicode",
            ));
        }
        let control_chars = text.chars().filter(|c| c.is_control() && *c != '\n' && *c != '\t').count();
        if control_chars > self.config.max_control_chars {
            return Ok(self.block(
                context,
                Severity::Medium,
                ViolationType::SuspiciousEncoding,
                format!("message contains {control_chars} control characters (max {})", self.config.max_control_chars),
            ));
        }

        let raw = message.to_json_string()?;
        let size = raw.len();
        if size < self.config.min_bytes || size > self.config.max_bytes {
            return Ok(self.block(
                context,
                Severity::Medium,
                ViolationType::SizeLimitExceeded,
                format!(
                    "serialized size {size} bytes outside [{}, {}]",
                    self.config.min_bytes, self.config.max_bytes
                ),
            ));
        }

        if let Some(params) = &message.params {
            if let Some(decision) = self.check_params_shape(params, context) {
                return Ok(decision);
            }
        }

        if let Some(missing) = methods::first_missing_param(&message.method, message.params.as_ref()) {
            return Ok(self.block(
                context,
                Severity::High,
                ViolationType::MissingRequiredParam,
                format!("method {:?} requires param `{missing}`", message.method),
            ));
        }

        Ok(Decision::Pass)
    }
}

impl StructureLayer {
    fn check_params_shape(&self, params: &Value, context: &ValidationContext) -> Option<Decision> {
        match params {
            Value::Object(map) if map.len() > self.config.max_params_entries => Some(self.block(
                context,
                Severity::Medium,
                ViolationType::ParamLimitExceeded,
                format!("params object has {} entries (max {})", map.len(), self.config.max_params_entries),
            )),
            Value::Array(arr) if arr.len() > self.config.max_params_entries => Some(self.block(
                context,
                Severity::Medium,
                ViolationType::ParamLimitExceeded,
                format!("params array has {} entries (max {})", arr.len(), self.config.max_params_entries),
            )),
            Value::Object(_) | Value::Array(_) => {
                if has_oversized_string_leaf(params, self.config.max_string_leaf_len) {
                    Some(self.block(
                        context,
                        Severity::Medium,
                        ViolationType::StringLimitExceeded,
                        format!("a string value in params exceeds {} characters", self.config.max_string_leaf_len),
                    ))
                } else {
                    None
                }
            }
            _ => Some(self.block(
                context,
                Severity::High,
                ViolationType::InvalidSchema,
                "params must be an object or array when present",
            )),
        }
    }
}

fn collect_text(message: &Message) -> String {
    let mut out = message.method.clone();
    if let Some(params) = &message.params {
        collect_string_leaves(params, &mut out);
    }
    out
}

fn collect_string_leaves(v: &Value, out: &mut String) {
    match v {
        Value::String(s) => out.push_str(s),
        Value::Array(arr) => arr.iter().for_each(|x| collect_string_leaves(x, out)),
        Value::Object(map) => map.values().for_each(|x| collect_string_leaves(x, out)),
        _ => {}
    }
}

fn is_valid_method_syntax(method: &str) -> bool {
    !method.is_empty()
        && method.chars().count() <= 100
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '/' | '-'))
}

fn has_oversized_string_leaf(v: &Value, max_len: usize) -> bool {
    match v {
        Value::String(s) => s.chars().count() > max_len,
        Value::Array(arr) => arr.iter().any(|x| has_oversized_string_leaf(x, max_len)),
        Value::Object(map) => map.values().any(|x| has_oversized_string_leaf(x, max_len)),
        _ => false,
    }
}
