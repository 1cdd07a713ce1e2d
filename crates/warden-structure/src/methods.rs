//! Required-field table for known MCP methods (last bullet).
//!
//! This is a coarser check than `warden-policy`'s tool-argument contract
//! (L4): it only asserts a named top-level param is present and has the
//! right JSON type, not that it names a registered tool or matches an
//! `argsShape`. Methods absent from this table are not rejected here —
//! unknown-method rejection is L4's `methodSpec` lookup, not L1's.

use serde_json::Value;

#[derive(Clone, Copy)]
pub(crate) enum ParamKind {
    String,
    Object,
}

impl ParamKind {
    fn matches(self, v: &Value) -> bool {
        match self {
            ParamKind::String => v.is_string(),
            ParamKind::Object => v.is_object(),
        }
    }
}

pub(crate) struct RequiredParam {
    pub(crate) name: &'static str,
    pub(crate) kind: ParamKind,
}

fn required_params(method: &str) -> &'static [RequiredParam] {
    match method {
        "tools/call" => &[RequiredParam {
            name: "name",
            kind: ParamKind::String,
        }],
        "resources/read" => &[RequiredParam {
            name: "uri",
            kind: ParamKind::String,
        }],
        "prompts/get" => &[RequiredParam {
            name: "name",
            kind: ParamKind::String,
        }],
        _ => &[],
    }
}

/// Returns the name of the first required param missing or mistyped for
/// `method`, or `None` if every requirement is met (including the case
/// where `method` has no requirements at all).
pub(crate) fn first_missing_param(method: &str, params: Option<&Value>) -> Option<&'static str> {
    required_params(method).iter().find_map(|req| {
        let satisfied = params
            .and_then(|p| p.get(req.name))
            .is_some_and(|v| req.kind.matches(v));
        (!satisfied).then_some(req.name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tools_call_requires_name() {
        assert_eq!(first_missing_param("tools/call", None), Some("name"));
        assert_eq!(
            first_missing_param("tools/call", Some(&json!({"name": "echo"}))),
            None
        );
        assert_eq!(
            first_missing_param("tools/call", Some(&json!({"name": 5}))),
            Some("name")
        );
    }

    #[test]
    fn resources_read_requires_uri() {
        assert_eq!(
            first_missing_param("resources/read", Some(&json!({"uri": "file:///x"}))),
            None
        );
        assert_eq!(
            first_missing_param("resources/read", Some(&json!({}))),
            Some("uri")
        );
    }

    #[test]
    fn unknown_method_has_no_requirements() {
        assert_eq!(first_missing_param("some/unlisted-method", None), None);
    }
}
