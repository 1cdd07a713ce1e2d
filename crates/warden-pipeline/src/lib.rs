//! # MCP Warden Pipeline
//!
//! The validation pipeline (C10): composes an ordered list of [`Layer`]
//! implementations into a single [`Pipeline::validate`] call, short-circuits
//! on the first block, and converts any layer exception into a CRITICAL
//! `ValidationError` decision rather than letting it propagate.

mod pipeline;
mod record;

pub use pipeline::Pipeline;
pub use record::{DecisionKind, DecisionRecord};

pub use warden_proto::Layer;
