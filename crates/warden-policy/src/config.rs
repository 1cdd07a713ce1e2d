//! Construction-time configuration for the semantic policy engine.

use std::collections::HashMap;

use crate::types::{ArgType, ChainingRule, MethodSpec, ResourcePolicy, SideEffect, ToolSpec};

#[derive(Clone)]
pub struct PolicyConfig {
    pub tool_registry: HashMap<String, ToolSpec>,
    pub resource_policy: ResourcePolicy,
    pub method_spec: HashMap<String, MethodSpec>,
    pub chaining_rules: Vec<ChainingRule>,
    /// Resolved Open Question: chaining (L4 step 5) is opt-in, `false` by
    /// default, but the rule schema above is always present and loadable.
    pub enable_chaining: bool,
    pub max_sessions: usize,
    pub session_ttl_ms: i64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let mut method_spec = HashMap::new();
        method_spec.insert(
            "tools/call".to_string(),
            MethodSpec { required: vec!["name".into()], optional: vec!["arguments".into()] },
        );
        method_spec.insert(
            "resources/read".to_string(),
            MethodSpec { required: vec!["uri".into()], optional: vec![] },
        );
        method_spec.insert(
            "prompts/get".to_string(),
            MethodSpec { required: vec!["name".into()], optional: vec!["arguments".into()] },
        );

        let mut tool_registry = HashMap::new();
        tool_registry.insert(
            "debug-echo".to_string(),
            ToolSpec::new("debug-echo", SideEffect::None)
                .with_arg("text", ArgType::String, false)
                .with_max_args_size(10_000),
        );
        tool_registry.insert(
            "debug-file-reader".to_string(),
            ToolSpec::new("debug-file-reader", SideEffect::Read)
                .with_arg("path", ArgType::String, false)
                .with_max_args_size(1_000),
        );

        Self {
            tool_registry,
            resource_policy: ResourcePolicy::default(),
            method_spec,
            chaining_rules: Vec::new(),
            enable_chaining: false,
            max_sessions: 5_000,
            session_ttl_ms: 1_800_000,
        }
    }
}
