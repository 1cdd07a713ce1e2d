//! The `Warden` facade (C12): a unified facade that orchestrates every
//! validation layer behind a simple API, acting as an async `onmessage`
//! interceptor sitting between a transport and a host's MCP server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::task::JoinHandle;
use warden_behavior::{BehaviorLayer, QuotaProvider};
use warden_contextual::ContextualLayer;
use warden_patterns::ContentLayer;
use warden_pipeline::Pipeline;
use warden_policy::SemanticLayer;
use warden_proto::{Decision, Layer, Message, ValidationContext, WardenError};
use warden_sanitizer::ErrorSanitizer;
use warden_structure::StructureLayer;

use crate::config::WardenConfig;
use crate::normalize::{classify, normalize, Classification};
use crate::transport::{Protocol, Transport};

/// Wraps a transport and a host protocol handler with the full validation
/// pipeline. One `Warden` per connection is the common case; the
/// internal state (quota provider, session memory, behavior counters) is
/// already safe to share across connections behind `Arc` if a host chooses
/// to multiplex several transports through one instance's layers instead.
pub struct Warden<T: Transport> {
    transport: T,
    protocol: Box<dyn Protocol>,
    pipeline: Pipeline,
    contextual: Arc<ContextualLayer>,
    behavior: Arc<BehaviorLayer>,
    quota: Arc<QuotaProvider>,
    sanitizer: ErrorSanitizer,
    default_policy: warden_proto::SideEffectPolicy,
    base_dir: Option<std::path::PathBuf>,
    sweep_interval: Duration,
    sweepers: Vec<JoinHandle<()>>,
}

impl<T: Transport> Warden<T> {
    #[must_use]
    pub fn new(config: WardenConfig, transport: T, protocol: impl Protocol + 'static) -> Self {
        let quota = QuotaProvider::new();
        let behavior = Arc::new(BehaviorLayer::new(config.behavior));
        let contextual = Arc::new(ContextualLayer::new());

        let mut layers: Vec<Box<dyn Layer>> = vec![
            Box::new(StructureLayer::new(config.structure)),
            Box::new(ContentLayer::new()),
            Box::new(Arc::clone(&behavior)),
            Box::new(SemanticLayer::new(config.policy, Arc::clone(&quota))),
        ];
        if config.enable_contextual {
            layers.push(Box::new(Arc::clone(&contextual)));
        }

        Self {
            transport,
            protocol: Box::new(protocol),
            pipeline: Pipeline::new(layers),
            contextual,
            behavior,
            quota,
            sanitizer: ErrorSanitizer::new(config.sanitizer),
            default_policy: config.default_policy,
            base_dir: config.base_dir,
            sweep_interval: config.sweep_interval,
            sweepers: Vec::new(),
        }
    }

    /// The L5 extension API: hosts register validators here
    /// without subclassing anything.
    #[must_use]
    pub fn contextual(&self) -> &Arc<ContextualLayer> {
        &self.contextual
    }

    /// Starts the transport and the background sweepers that bound this
    /// `Warden`'s memory use ("bounded memory" guarantee).
    pub fn connect(&mut self) {
        self.transport.start();
        self.sweepers.push(Arc::clone(&self.behavior).spawn_sweeper(self.sweep_interval));
        self.sweepers.push(self.quota.spawn_sweeper(self.sweep_interval));
    }

    fn new_context(&self) -> ValidationContext {
        let mut ctx = ValidationContext::new(Utc::now());
        ctx.client_id = self.transport.session_id();
        ctx.policy = self.default_policy;
        ctx.base_dir = self.base_dir.clone();
        ctx
    }

    /// The `onmessage` interceptor itself. Classifies `value`,
    /// validates it if it's a request or notification, and either forwards
    /// it to the protocol, sends a sanitized error, or drops it silently.
    pub async fn handle_inbound(&self, value: Value) -> Result<(), WardenError> {
        match classify(&value) {
            Classification::Response => {
                // Never validated — the host already spoke it.
                self.transport.send(value).await
            }
            Classification::Notification => {
                let message = normalize(&value);
                let mut context = self.new_context();
                if self.pipeline.validate(&message, &mut context).is_pass() {
                    self.protocol.on_message(&message);
                }
                // Blocked notifications are dropped silently; no response is due.
                Ok(())
            }
            Classification::Request => {
                let message = normalize(&value);
                let mut context = self.new_context();
                match self.pipeline.validate(&message, &mut context) {
                    Decision::Pass => {
                        self.protocol.on_message(&message);
                        Ok(())
                    }
                    Decision::Block(outcome) => {
                        let (response, _correlation_id) = self.sanitizer.create_sanitized_error_response(
                            message.id.clone(),
                            &outcome.reason,
                            outcome.severity,
                            outcome.violation,
                        );
                        self.transport.send(response).await
                    }
                }
            }
        }
    }

    /// Runs a host-produced response through the optional L5 response
    /// validators (e.g. secret scrubbing) before sending it. Distinct from
    /// the never-validated `Response` classification in
    /// [`handle_inbound`](Self::handle_inbound), which covers responses a
    /// transport relays through `onmessage` verbatim; this path is for
    /// content this process itself is about to emit.
    pub async fn send_response(&self, response: Value, request: &Message) -> Result<(), WardenError> {
        let context = self.new_context();
        match self.contextual.validate_response(&response, request, &context)? {
            Decision::Pass => self.transport.send(response).await,
            Decision::Block(outcome) => {
                let (sanitized, _correlation_id) = self.sanitizer.create_sanitized_error_response(
                    request.id.clone(),
                    &outcome.reason,
                    outcome.severity,
                    outcome.violation,
                );
                self.transport.send(sanitized).await
            }
        }
    }

    /// Flushes background work and closes the transport: aborts the sweep
    /// tasks, calls `destroy()` on the quota provider, then closes the
    /// transport.
    pub fn shutdown(&mut self) {
        for handle in self.sweepers.drain(..) {
            handle.abort();
        }
        self.quota.destroy();
        self.transport.close();
    }
}
