//! The logging decision record: the minimum field set a pipeline
//! decision carries, handed to whatever tracing subscriber the host has
//! installed — the core has no file-sink/rotation concerns of its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use warden_proto::{Message, Severity, ViolationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionKind {
    Allow,
    Block,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord<'a> {
    pub event: &'static str,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<&'a serde_json::Value>,
    pub layer: &'static str,
    pub decision: DecisionKind,
    pub passed: bool,
    pub severity: Severity,
    pub violation_type: ViolationType,
    pub reason: String,
    pub method: &'a str,
    pub message_size: usize,
}

impl<'a> DecisionRecord<'a> {
    #[must_use]
    pub fn allow(message: &'a Message, message_size: usize, now: DateTime<Utc>) -> Self {
        Self {
            event: "pipeline.decision",
            timestamp: now,
            request_id: message.id.as_ref(),
            layer: "none",
            decision: DecisionKind::Allow,
            passed: true,
            severity: Severity::None,
            violation_type: ViolationType::Unknown,
            reason: "No reason provided".to_string(),
            method: &message.method,
            message_size,
        }
    }

    #[must_use]
    pub fn block(
        message: &'a Message,
        message_size: usize,
        layer: &'static str,
        severity: Severity,
        violation_type: ViolationType,
        reason: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            event: "pipeline.decision",
            timestamp: now,
            request_id: message.id.as_ref(),
            layer,
            decision: DecisionKind::Block,
            passed: false,
            severity,
            violation_type,
            reason,
            method: &message.method,
            message_size,
        }
    }

    pub fn emit(&self) {
        match self.decision {
            DecisionKind::Allow => tracing::debug!(
                event = self.event,
                method = self.method,
                message_size = self.message_size,
                "pipeline allowed message"
            ),
            DecisionKind::Block => tracing::info!(
                event = self.event,
                layer = self.layer,
                severity = ?self.severity,
                violation_type = ?self.violation_type,
                reason = %self.reason,
                method = self.method,
                message_size = self.message_size,
                "pipeline blocked message"
            ),
        }
    }
}
