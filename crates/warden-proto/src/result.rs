//! The validation result algebra.
//!
//! A loosely typed `{passed, allowed, severity, reason, violationType, ...}`
//! shape is replaced here with a closed sum type: a message
//! either [`Decision::Pass`]es or is [`Decision::Block`]ed with a concrete
//! reason. The wire/log projection ([`ValidationResult`]) is a flattening of
//! this sum, not the primary representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a blocked message, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

/// The fixed violation taxonomy a layer may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ViolationType {
    // Protocol / structure
    InvalidProtocol,
    InvalidMethod,
    InvalidSchema,
    MalformedMessage,
    SizeLimitExceeded,
    StringLimitExceeded,
    ParamLimitExceeded,
    DangerousEncoding,
    SuspiciousEncoding,
    MissingRequiredParam,
    InvalidMcpMethod,

    // Content
    PathTraversal,
    XssAttempt,
    SqlInjection,
    CommandInjection,
    ScriptInjection,
    CssInjection,
    BufferOverflowAttempt,
    SsrfAttempt,
    NosqlInjection,
    GraphqlInjection,
    DeserializationInjection,
    PrototypePollution,
    XmlEntityAttack,
    CrlfInjection,
    DangerousDataUri,
    Base64Injection,
    NestedDataUri,
    SecretLeak,
    CsvInjection,

    // Behavior
    RateLimitExceeded,
    BurstActivity,
    OversizedMessage,
    AutomatedTiming,
    SuspiciousMethod,

    // Semantic
    ToolNotAllowed,
    InvalidToolArguments,
    ArgsEgressLimit,
    ToolEgressLimit,
    SideEffectNotAllowed,
    ResourcePolicyViolation,
    ResourceEgressLimit,
    QuotaExceeded,
    ChainViolation,
    ArgSerializationError,

    // Framework
    ValidationError,
    ValidatorError,
    InternalError,

    /// Used only when normalizing an under-specified layer result .
    Unknown,
}

impl ViolationType {
    /// Maps a violation to a JSON-RPC error code .
    #[must_use]
    pub fn error_code(self) -> i64 {
        match self {
            Self::RateLimitExceeded => -32000,
            Self::InternalError | Self::ValidationError => -32603,
            _ => -32602,
        }
    }
}

/// The outcome of a blocked validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockOutcome {
    pub severity: Severity,
    pub violation: ViolationType,
    pub reason: String,
    pub confidence: f64,
    pub layer_name: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// The result of running a single layer (or the whole pipeline) over a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decision {
    Pass,
    Block(BlockOutcome),
}

impl Decision {
    /// Builds a blocked decision.
    #[must_use]
    pub fn block(
        layer_name: &'static str,
        severity: Severity,
        violation: ViolationType,
        reason: impl Into<String>,
        confidence: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self::Block(BlockOutcome {
            severity,
            violation,
            reason: reason.into(),
            confidence,
            layer_name,
            timestamp: now,
        })
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}

/// Wire/log projection of a [`Decision`].
///
/// This is the shape the logging record schema and the error sanitizer
/// consume. `passed = true` implies `severity = None` and an informational
/// reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub severity: Severity,
    pub reason: String,
    pub violation_type: ViolationType,
    pub confidence: f64,
    pub layer_name: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl From<Decision> for ValidationResult {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Pass => ValidationResult {
                passed: true,
                severity: Severity::None,
                reason: "No reason provided".to_string(),
                violation_type: ViolationType::Unknown,
                confidence: 1.0,
                layer_name: "none",
                timestamp: Utc::now(),
            },
            Decision::Block(outcome) => ValidationResult {
                passed: false,
                severity: outcome.severity,
                reason: outcome.reason,
                violation_type: outcome.violation,
                confidence: outcome.confidence,
                layer_name: outcome.layer_name,
                timestamp: outcome.timestamp,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_mapping() {
        assert_eq!(ViolationType::RateLimitExceeded.error_code(), -32000);
        assert_eq!(ViolationType::InternalError.error_code(), -32603);
        assert_eq!(ViolationType::ValidationError.error_code(), -32603);
        assert_eq!(ViolationType::PathTraversal.error_code(), -32602);
    }

    #[test]
    fn pass_projects_to_passed_none() {
        let result: ValidationResult = Decision::Pass.into();
        assert!(result.passed);
        assert_eq!(result.severity, Severity::None);
    }

    #[test]
    fn block_projects_fields_through() {
        let decision = Decision::block(
            "Layer2-Content",
            Severity::High,
            ViolationType::PathTraversal,
            "path traversal detected",
            0.95,
            Utc::now(),
        );
        let result: ValidationResult = decision.into();
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.violation_type, ViolationType::PathTraversal);
        assert_eq!(result.layer_name, "Layer2-Content");
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::None);
    }
}
