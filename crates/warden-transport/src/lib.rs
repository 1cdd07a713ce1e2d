//! # MCP Warden Transport
//!
//! The secure transport wrapper (C12) and the `Warden` embedder-facing
//! facade: classifies inbound
//! JSON-RPC values as requests, notifications, or responses, runs the full
//! validation pipeline over the first two, and exposes `connect`/`shutdown`
//! plus the L5 extension API.

mod config;
mod normalize;
mod transport;
mod warden;

pub use config::{WardenConfig, WardenMode};
pub use normalize::{classify, normalize, Classification};
pub use transport::{Protocol, Transport};
pub use warden::Warden;
