//! `tools/call` contract checks: registry lookup, argument shape, size
//! limits, side-effect gating.

use serde_json::Value;
use warden_proto::SideEffectPolicy;

use crate::types::{SideEffect, ToolSpec};

pub(crate) enum ToolFailure {
    NotAllowed,
    MissingParam(String),
    InvalidArgType(String),
    ArgsTooLarge,
    SideEffectNotAllowed,
    EgressTooLarge,
}

/// Validates `arguments` against `tool.args_shape` and the size limit, not
/// including quota or side-effect checks (those need the quota provider and
/// `ValidationContext`, which the layer threads through separately).
pub(crate) fn check_args_shape(tool: &ToolSpec, arguments: Option<&Value>) -> Option<ToolFailure> {
    for (name, spec) in &tool.args_shape {
        let value = arguments.and_then(|a| a.get(name));
        match value {
            None if !spec.optional => return Some(ToolFailure::MissingParam(name.clone())),
            None => {}
            Some(v) if !spec.arg_type.matches(v) => return Some(ToolFailure::InvalidArgType(name.clone())),
            Some(_) => {}
        }
    }

    if let Some(max) = tool.max_args_size {
        let size = arguments.map_or(0, |a| serde_json::to_string(a).map(|s| s.len()).unwrap_or(0));
        if size > max {
            return Some(ToolFailure::ArgsTooLarge);
        }
    }

    None
}

/// Side-effect gating plus the egress-size estimate (step 4).
pub(crate) fn check_side_effects(tool: &ToolSpec, policy: &SideEffectPolicy, arguments: Option<&Value>) -> Option<ToolFailure> {
    let allowed = match tool.side_effects {
        SideEffect::None | SideEffect::Read => true,
        SideEffect::Write => policy.allow_writes,
        SideEffect::Network => policy.allow_network,
    };
    if !allowed {
        return Some(ToolFailure::SideEffectNotAllowed);
    }

    if let Some(max) = tool.max_egress_bytes {
        let size = arguments.map_or(0, |a| serde_json::to_string(a).map(|s| s.len()).unwrap_or(0));
        let estimated = (tool.estimated_egress)(size);
        if estimated > max {
            return Some(ToolFailure::EgressTooLarge);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArgType;
    use serde_json::json;

    fn sample_tool() -> ToolSpec {
        ToolSpec::new("debug-file-reader", SideEffect::Read).with_arg("path", ArgType::String, false)
    }

    #[test]
    fn missing_required_arg_fails() {
        let tool = sample_tool();
        assert!(matches!(check_args_shape(&tool, None), Some(ToolFailure::MissingParam(_))));
        assert!(matches!(check_args_shape(&tool, Some(&json!({}))), Some(ToolFailure::MissingParam(_))));
    }

    #[test]
    fn wrong_type_fails() {
        let tool = sample_tool();
        assert!(matches!(check_args_shape(&tool, Some(&json!({"path": 5}))), Some(ToolFailure::InvalidArgType(_))));
    }

    #[test]
    fn present_and_well_typed_passes() {
        let tool = sample_tool();
        assert!(check_args_shape(&tool, Some(&json!({"path": "/tmp/x"}))).is_none());
    }

    #[test]
    fn oversized_args_fail() {
        let tool = sample_tool().with_max_args_size(5);
        assert!(matches!(check_args_shape(&tool, Some(&json!({"path": "a long path value"}))), Some(ToolFailure::ArgsTooLarge)));
    }

    #[test]
    fn write_tool_requires_policy_flag() {
        let tool = ToolSpec::new("writer", SideEffect::Write);
        let denied = SideEffectPolicy { allow_network: false, allow_writes: false };
        let allowed = SideEffectPolicy { allow_network: false, allow_writes: true };
        assert!(matches!(check_side_effects(&tool, &denied, None), Some(ToolFailure::SideEffectNotAllowed)));
        assert!(check_side_effects(&tool, &allowed, None).is_none());
    }

    #[test]
    fn read_tool_never_needs_a_flag() {
        let tool = ToolSpec::new("reader", SideEffect::Read);
        let denied = SideEffectPolicy { allow_network: false, allow_writes: false };
        assert!(check_side_effects(&tool, &denied, None).is_none());
    }
}
