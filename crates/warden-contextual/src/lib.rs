//! # MCP Warden Contextual
//!
//! Layer 5 (C9): the optional, host-extensible contextual layer. Unlike
//! every other layer in this workspace, L5 has no fixed rule set of its
//! own — it is a typed surface for a host to register request validators,
//! response validators, and global rules without subclassing anything.

mod builtins;
mod layer;
mod store;
mod validators;

pub use builtins::{oauth_redirect_validator, per_method_rate_shaper, response_secret_scrub_validator};
pub use layer::ContextualLayer;
pub use store::ContextStore;
pub use validators::{ResponseValidatorFn, ValidatorFn, ValidatorOptions};
