//! # MCP Warden Structure
//!
//! Layer 1: JSON-RPC 2.0 schema, size, encoding, control-character and
//! unicode hygiene, and MCP method-specific required fields. Runs before
//! the content layer — a message that fails here never reaches pattern
//! matching at all.
//!
//! Built in the same ordered-check, first-failure-wins style as the other
//! layers in this workspace, with a `thiserror`-free surface since every
//! failure here is represented as a `Decision`, not an `Err`.

mod config;
mod layer;
mod methods;

pub use config::StructureConfig;
pub use layer::StructureLayer;
