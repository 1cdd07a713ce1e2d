//! Inbound message classification and normalization.
//!
//! Normalization maps SDK-variant request shapes `{method, params, id?}` to
//! `{jsonrpc, method, params, id}` — except it deliberately does NOT
//! default a missing `jsonrpc` field to `"2.0"`: the structure layer is what
//! must see and reject that absence, so a missing field normalizes to an
//! empty string, not a silently-assumed version.

use serde_json::Value;
use warden_proto::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Request,
    Notification,
    /// A server-produced response: never validated, forwarded verbatim.
    Response,
}

/// Classifies a raw inbound value into one of three cases. A value matching
/// none of the three (e.g. no `method` and no `result`/`error`) is treated
/// as a malformed request so it still reaches the pipeline and is rejected
/// there, rather than being silently dropped.
#[must_use]
pub fn classify(value: &Value) -> Classification {
    let obj = value.as_object();
    let has_method = obj.is_some_and(|o| o.contains_key("method"));
    let has_id = obj.is_some_and(|o| o.contains_key("id"));
    let has_result_or_error = obj.is_some_and(|o| o.contains_key("result") || o.contains_key("error"));

    if has_method {
        if has_id {
            Classification::Request
        } else {
            Classification::Notification
        }
    } else if has_id && has_result_or_error {
        Classification::Response
    } else {
        Classification::Request
    }
}

/// Builds the canonical [`Message`] the pipeline validates. Never mutates
/// or consumes `value` — the wrapper forwards the original to the protocol
/// or the transport, not a re-serialization of this projection.
#[must_use]
pub fn normalize(value: &Value) -> Message {
    let obj = value.as_object();
    Message {
        jsonrpc: obj.and_then(|o| o.get("jsonrpc")).and_then(Value::as_str).unwrap_or_default().to_string(),
        method: obj.and_then(|o| o.get("method")).and_then(Value::as_str).unwrap_or_default().to_string(),
        id: obj.and_then(|o| o.get("id")).cloned(),
        params: obj.and_then(|o| o.get("params")).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_has_method_and_id() {
        let v = json!({"jsonrpc": "2.0", "method": "tools/call", "id": 1, "params": {}});
        assert_eq!(classify(&v), Classification::Request);
    }

    #[test]
    fn notification_has_method_but_no_id() {
        let v = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert_eq!(classify(&v), Classification::Notification);
    }

    #[test]
    fn response_has_id_and_result_but_no_method() {
        let v = json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}});
        assert_eq!(classify(&v), Classification::Response);
    }

    #[test]
    fn response_with_error_is_also_a_response() {
        let v = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "x"}});
        assert_eq!(classify(&v), Classification::Response);
    }

    #[test]
    fn missing_jsonrpc_normalizes_to_empty_string_not_assumed_two_point_zero() {
        let v = json!({"method": "tools/call", "id": "abc", "params": {"name": "debug-echo"}});
        let m = normalize(&v);
        assert_eq!(m.jsonrpc, "");
        assert_eq!(m.method, "tools/call");
    }

    #[test]
    fn malformed_value_with_neither_method_nor_response_shape_classifies_as_request() {
        let v = json!({"jsonrpc": "2.0"});
        assert_eq!(classify(&v), Classification::Request);
    }
}
