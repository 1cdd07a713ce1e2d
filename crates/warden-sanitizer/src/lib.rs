//! # MCP Warden Sanitizer
//!
//! The error sanitizer (C11): correlation/public token generation, credential
//! and PII redaction, and the JSON-RPC error response builder every blocked
//! request and layer exception is funneled through before it leaves the
//! process boundary.

mod correlation;
mod messages;
mod redact;
mod sanitizer;

pub use correlation::{generate_correlation_id, generate_public_token};
pub use redact::redact;
pub use sanitizer::{ErrorSanitizer, SanitizerConfig, SanitizerMode};
