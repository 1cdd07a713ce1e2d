//! The error sanitizer facade (C11).

use rand::RngCore;
use serde_json::{json, Value};
use warden_proto::{Severity, ViolationType};

use crate::correlation::{generate_correlation_id, generate_public_token};
use crate::messages;
use crate::redact::redact;

/// Whether `getSanitizedMessage` returns a canned per-violation string or a
/// randomly selected generic one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizerMode {
    Production,
    Development,
}

#[derive(Debug, Clone, Copy)]
pub struct SanitizerConfig {
    pub mode: SanitizerMode,
    pub max_log_length: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self { mode: SanitizerMode::Production, max_log_length: 500 }
    }
}

/// Milliseconds suggested to the caller before retrying a rate-limited
/// request.
const RATE_LIMIT_RETRY_AFTER_MS: u64 = 60_000;

pub struct ErrorSanitizer {
    config: SanitizerConfig,
}

impl ErrorSanitizer {
    #[must_use]
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    /// Production mode: a CSPRNG-selected message from a small generic
    /// pool. Development mode: a specific canned message per violation.
    #[must_use]
    pub fn get_sanitized_message(&self, violation: ViolationType) -> String {
        match self.config.mode {
            SanitizerMode::Development => messages::canned_message(violation).to_string(),
            SanitizerMode::Production => {
                let mut byte = [0u8; 1];
                rand::thread_rng().fill_bytes(&mut byte);
                messages::generic_message(byte[0]).to_string()
            }
        }
    }

    #[must_use]
    pub fn map_severity_to_error_code(violation: ViolationType) -> i64 {
        violation.error_code()
    }

    /// Redacts credentials/PII from `value` and truncates to the
    /// configured `max_log_length`.
    #[must_use]
    pub fn redact(&self, value: Option<&str>) -> String {
        redact(value, self.config.max_log_length)
    }

    /// Builds the full JSON-RPC error response plus the correlation id the
    /// real `internal_reason` should be logged under. The response never
    /// contains `internal_reason` itself, only the sanitized message and a
    /// short public token.
    pub fn create_sanitized_error_response(
        &self,
        id: Option<Value>,
        internal_reason: &str,
        severity: Severity,
        violation: ViolationType,
    ) -> (Value, String) {
        let correlation_id = generate_correlation_id();
        let public_token = generate_public_token();
        let redacted_reason = self.redact(Some(internal_reason));

        tracing::warn!(
            correlation_id = %correlation_id,
            severity = ?severity,
            violation = ?violation,
            reason = %redacted_reason,
            "blocked request"
        );

        let mut data = json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "token": public_token,
        });
        if violation == ViolationType::RateLimitExceeded {
            data["retryAfterMs"] = json!(RATE_LIMIT_RETRY_AFTER_MS);
        }

        let response = json!({
            "jsonrpc": "2.0",
            "id": id.unwrap_or(Value::Null),
            "error": {
                "code": Self::map_severity_to_error_code(violation),
                "message": self.get_sanitized_message(violation),
                "data": data,
            }
        });

        (response, correlation_id)
    }
}

impl Default for ErrorSanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_gets_retry_after() {
        let sanitizer = ErrorSanitizer::default();
        let (response, _) = sanitizer.create_sanitized_error_response(
            Some(json!(7)),
            "per-minute quota exceeded for tool:echo: 61/60",
            Severity::High,
            ViolationType::RateLimitExceeded,
        );
        assert_eq!(response["error"]["code"], json!(-32000));
        assert_eq!(response["error"]["data"]["retryAfterMs"], json!(60_000));
        assert!(response["error"]["message"].as_str().unwrap().len() > 0);
        assert!(!response["error"]["message"].as_str().unwrap().contains("tool:echo"));
    }

    #[test]
    fn non_rate_limit_violation_has_no_retry_after() {
        let sanitizer = ErrorSanitizer::default();
        let (response, _) =
            sanitizer.create_sanitized_error_response(Some(json!(1)), "boom", Severity::High, ViolationType::PathTraversal);
        assert!(response["error"]["data"].get("retryAfterMs").is_none());
        assert_eq!(response["error"]["code"], json!(-32602));
    }

    #[test]
    fn missing_id_becomes_null() {
        let sanitizer = ErrorSanitizer::default();
        let (response, _) =
            sanitizer.create_sanitized_error_response(None, "boom", Severity::Critical, ViolationType::InternalError);
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], json!(-32603));
    }

    #[test]
    fn development_mode_returns_specific_canned_text() {
        let sanitizer = ErrorSanitizer::new(SanitizerConfig { mode: SanitizerMode::Development, max_log_length: 500 });
        let msg = sanitizer.get_sanitized_message(ViolationType::PathTraversal);
        assert!(msg.contains("path"));
    }

    #[test]
    fn internal_reason_never_appears_in_the_response() {
        let sanitizer = ErrorSanitizer::default();
        let secret_path = "/etc/shadow";
        let (response, _) = sanitizer.create_sanitized_error_response(
            Some(json!(1)),
            &format!("blocked read of {secret_path}"),
            Severity::High,
            ViolationType::PathTraversal,
        );
        let serialized = response.to_string();
        assert!(!serialized.contains(secret_path));
    }
}
