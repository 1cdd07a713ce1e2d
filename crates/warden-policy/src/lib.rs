//! # MCP Warden Policy
//!
//! The semantic policy engine (C7) and Layer 4 (C8): `tools/call`/
//! `resources/read` contract enforcement, side-effect/egress gating, and
//! optional method chaining, built on top of the quota provider and session
//! memory from [`warden_behavior`]. A registry facade answers "does this
//! call satisfy the configured capability/quota policy."

mod config;
mod globs;
mod layer;
mod resource;
mod tool;
mod types;

pub use config::PolicyConfig;
pub use globs::compile_deny_glob;
pub use layer::SemanticLayer;
pub use types::{ArgSpec, ArgType, ChainingRule, MethodSpec, ResourcePolicy, SideEffect, ToolSpec};
