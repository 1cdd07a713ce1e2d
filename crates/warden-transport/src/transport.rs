//! The transport and protocol seams `Warden` wraps: it wraps a transport
//! with an `onmessage` interceptor.
//!
//! Concrete transports (stdio, streamable HTTP) are an out-of-scope external
//! collaborator — only the wrapping contract is implemented here.

use serde_json::Value;
use warden_proto::{Message, WardenError};

/// The outbound half of a wrapped connection: where sanitized error
/// responses and pass-through responses are sent. `start`/`close`/`send`/
/// `session_id` all pass through to the wrapped transport.
pub trait Transport: Send + Sync {
    /// Sends a JSON-RPC value down the wire. May suspend (network I/O) —
    /// this is one of the few suspension points a layer is allowed.
    fn send(&self, message: Value) -> impl std::future::Future<Output = Result<(), WardenError>> + Send;
    // Written as an explicit `-> impl Future` rather than `async fn` so the
    // bound (`+ Send`) is spelled out for callers that hold a `Warden` across
    // an `.await` themselves.

    fn start(&mut self) {}

    fn close(&mut self) {}

    #[must_use]
    fn session_id(&self) -> Option<String> {
        None
    }
}

/// The inbound half: the wrapped MCP server framework that dispatches
/// validated requests/notifications to tool/resource/prompt handlers. An
/// out-of-scope external collaborator — `Warden` only needs to hand it
/// messages that passed the pipeline.
pub trait Protocol: Send + Sync {
    fn on_message(&self, message: &Message);
}

impl<F: Fn(&Message) + Send + Sync> Protocol for F {
    fn on_message(&self, message: &Message) {
        self(message)
    }
}
