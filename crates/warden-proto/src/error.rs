//! Crate-wide error type.

use thiserror::Error;

/// Errors internal to a layer's implementation, distinct from a message
/// failing validation (which is represented as `Decision::Block`, not an
/// `Err`).
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}
