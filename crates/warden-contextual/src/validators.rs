//! Validator function types and per-validator configuration.

use serde_json::Value;
use warden_proto::{Decision, Message, ValidationContext, WardenError};

/// A host-supplied request validator or global rule.
pub type ValidatorFn = dyn Fn(&Message, &ValidationContext) -> Result<Decision, WardenError> + Send + Sync;

/// A host-supplied response validator: sees the outbound payload plus the
/// request that produced it.
pub type ResponseValidatorFn = dyn Fn(&Value, &Message, &ValidationContext) -> Result<Decision, WardenError> + Send + Sync;

/// Options accepted by `addValidator`.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorOptions {
    pub enabled: bool,
    /// Lower runs first.
    pub priority: i32,
    /// If this validator passes, stop evaluating the remaining validators.
    pub skip_on_success: bool,
    /// If set, a thrown error becomes a MEDIUM `VALIDATOR_ERROR` block
    /// instead of being swallowed as a pass.
    pub fail_on_error: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self { enabled: true, priority: 0, skip_on_success: false, fail_on_error: false }
    }
}

pub(crate) struct RequestValidator {
    pub name: String,
    pub f: Box<ValidatorFn>,
    pub options: ValidatorOptions,
}

pub(crate) struct ResponseValidator {
    pub name: String,
    pub f: Box<ResponseValidatorFn>,
    pub enabled: bool,
}

pub(crate) struct GlobalRule {
    pub f: Box<ValidatorFn>,
    pub enabled: bool,
}
