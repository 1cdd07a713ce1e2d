//! The validated unit: a single JSON-RPC 2.0 message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON-RPC 2.0 message as seen by the validation pipeline.
///
/// `Message` is request-scoped and never mutated by the core: layers read
/// it, they never rewrite it in place. The secure transport wrapper forwards
/// the original value it received, not a re-serialization of this struct.
///
/// # Fields
///
/// - `jsonrpc` must equal `"2.0"` (checked by the structure layer).
/// - `method` matches `^[A-Za-z0-9_/-]+$` and is at most 100 characters.
/// - `id` is a JSON-RPC request id: string, number, null, or absent
///   (absent distinguishes a notification from a request).
/// - `params` is an object or array when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Message {
    /// Returns `true` if this message is a JSON-RPC notification (no `id`).
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Serializes the message to its wire-form JSON string.
    ///
    /// Used by layers that need to measure size or run textual checks over
    /// the whole message rather than a single field.
    ///
    /// # Errors
    ///
    /// Returns an error only if the message contains non-finite floats,
    /// which `serde_json` refuses to serialize.
    pub fn to_json_string(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_has_no_id() {
        let msg = Message {
            jsonrpc: "2.0".into(),
            method: "tools/call".into(),
            id: None,
            params: None,
        };
        assert!(msg.is_notification());
    }

    #[test]
    fn request_has_id() {
        let msg = Message {
            jsonrpc: "2.0".into(),
            method: "tools/call".into(),
            id: Some(Value::from(1)),
            params: None,
        };
        assert!(!msg.is_notification());
    }

    #[test]
    fn round_trips_through_json() {
        let msg = Message {
            jsonrpc: "2.0".into(),
            method: "tools/call".into(),
            id: Some(Value::from("abc")),
            params: Some(serde_json::json!({"name": "echo"})),
        };
        let s = msg.to_json_string().unwrap();
        let parsed: Message = serde_json::from_str(&s).unwrap();
        assert_eq!(parsed.method, "tools/call");
        assert_eq!(parsed.id, Some(Value::from("abc")));
    }
}
