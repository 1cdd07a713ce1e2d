//! # MCP Warden Behavior
//!
//! Layer 3 (rate/burst/oversize/automated-timing/probing heuristics), the
//! keyed quota provider used by the semantic layer, and session memory.
//!
//! The quota counter uses an increment-then-check pattern; `QuotaProvider::sweep`
//! and `SessionMemory::cleanup` both implement a periodic-sweep-with-TTL idea.
//! The behavior layer itself (global rate/burst state, not per-key) is an
//! ordered-check, first-failure-wins layer like the others in this workspace.

mod config;
mod layer;
mod probing;
mod quota;
mod session;
mod window;

pub use config::BehaviorConfig;
pub use layer::BehaviorLayer;
pub use quota::{QuotaCheck, QuotaLimits, QuotaProvider};
pub use session::SessionMemory;
