//! # MCP Warden Patterns
//!
//! The content layer (L2) and the static attack pattern catalog it scans.
//! A catalog-builder / scanner pair covers nineteen injection families,
//! reporting through the shared [`warden_proto::Decision`] algebra.
//!
//! ## Pipeline position
//!
//! Runs after [`warden_structure`](../warden_structure/index.html) (L1) and
//! before the behavior layer (L3). On entry it canonicalizes the message
//! exactly once via [`warden_canon::canonicalize`] and records the result in
//! [`ValidationContext::canonical`](warden_proto::ValidationContext) for
//! every layer after it to reuse — canonicalization is not repeated
//! downstream.
//!
//! ## Catalog admission
//!
//! Every pattern is checked at first use against
//! [`admission::require_redos_safe`], which rejects any pattern whose parsed
//! form nests one unbounded quantifier inside another. `regex`'s own
//! automaton can't actually be driven into exponential blowup, but a pattern
//! shaped that way is a maintenance smell worth catching at the door rather
//! than trusting by convention.

mod admission;
mod cache;
mod catalog;
mod css;
mod dataurl;
mod layer;

pub use catalog::{catalog, AttackPattern};
pub use layer::ContentLayer;
