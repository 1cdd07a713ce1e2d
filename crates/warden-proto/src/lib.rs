//! # MCP Warden Proto
//!
//! Shared types that cross every layer of the validation pipeline: the
//! [`Message`] being validated, the [`ValidationContext`] that accompanies it,
//! and the [`Decision`] algebra every layer returns.
//!
//! No other `warden-*` crate depends on anything but this crate and its own
//! leaf dependencies — it is the one piece of shared vocabulary the rest of
//! the workspace is built on.
//!
//! ## Security Notes
//!
//! [`ValidationContext::canonical`] is filled exactly once, by the content
//! layer, and is never overwritten afterwards. Every downstream layer that
//! needs to pattern-match against message content MUST read this field
//! rather than re-deriving it from the raw message — canonicalization
//! correctness is the foundation every content check relies on.

mod context;
mod error;
mod layer;
mod message;
mod result;

pub use context::{SideEffectPolicy, ValidationContext};
pub use error::WardenError;
pub use layer::{Layer, LayerName};
pub use message::Message;
pub use result::{BlockOutcome, Decision, Severity, ValidationResult, ViolationType};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WardenError>;
