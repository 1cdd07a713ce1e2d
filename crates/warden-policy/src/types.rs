//! Policy data model: `ToolSpec`, `ResourcePolicy`, `MethodSpec`,
//! `ChainingRule` — plain data, `Serialize`/`Deserialize`, one doc block
//! per field.

use std::collections::HashMap;
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The capability class a tool requires to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffect {
    None,
    Read,
    Write,
    Network,
}

/// The JSON type an argument must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ArgType {
    #[must_use]
    pub fn matches(self, v: &serde_json::Value) -> bool {
        match self {
            Self::String => v.is_string(),
            Self::Number => v.is_number(),
            Self::Boolean => v.is_boolean(),
            Self::Array => v.is_array(),
            Self::Object => v.is_object(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub arg_type: ArgType,
    pub optional: bool,
}

/// Registry entry for one `tools/call`-reachable tool.
#[derive(Clone)]
pub struct ToolSpec {
    pub name: String,
    pub side_effects: SideEffect,
    pub max_args_size: Option<usize>,
    pub max_egress_bytes: Option<usize>,
    pub args_shape: HashMap<String, ArgSpec>,
    pub quota_per_minute: Option<u64>,
    pub quota_per_hour: Option<u64>,
    /// Egress estimator, resolved from an open design question as a
    /// configurable function rather than a hardcoded `×16` (default below).
    pub estimated_egress: fn(usize) -> usize,
}

fn default_estimated_egress(serialized_args_bytes: usize) -> usize {
    serialized_args_bytes * 16
}

impl ToolSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, side_effects: SideEffect) -> Self {
        Self {
            name: name.into(),
            side_effects,
            max_args_size: None,
            max_egress_bytes: None,
            args_shape: HashMap::new(),
            quota_per_minute: None,
            quota_per_hour: None,
            estimated_egress: default_estimated_egress,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, arg_type: ArgType, optional: bool) -> Self {
        self.args_shape.insert(name.into(), ArgSpec { arg_type, optional });
        self
    }

    #[must_use]
    pub fn with_max_args_size(mut self, bytes: usize) -> Self {
        self.max_args_size = Some(bytes);
        self
    }
}

/// Access policy for `resources/read`.
#[derive(Clone)]
pub struct ResourcePolicy {
    pub allowed_schemes: Vec<String>,
    pub allowed_hosts: Option<Vec<String>>,
    pub root_dirs: Option<Vec<PathBuf>>,
    pub deny_globs: Option<Vec<Regex>>,
    pub max_path_length: Option<usize>,
    pub max_uri_length: Option<usize>,
    pub max_read_bytes: Option<usize>,
    pub quota_per_minute: Option<u64>,
    pub quota_per_hour: Option<u64>,
    /// Resolved from an open design question: `min(10_000_000, len*1024)` by
    /// default, overridable by a host.
    pub estimated_read_bytes: fn(usize) -> usize,
}

fn default_estimated_read_bytes(uri_len: usize) -> usize {
    (uri_len * 1024).min(10_000_000)
}

impl Default for ResourcePolicy {
    fn default() -> Self {
        Self {
            allowed_schemes: vec!["file".into(), "http".into(), "https".into()],
            allowed_hosts: None,
            root_dirs: None,
            deny_globs: None,
            max_path_length: Some(4096),
            max_uri_length: Some(2048),
            max_read_bytes: Some(10_000_000),
            quota_per_minute: None,
            quota_per_hour: None,
            estimated_read_bytes: default_estimated_read_bytes,
        }
    }
}

/// Required/optional top-level params for one MCP method.
#[derive(Debug, Clone, Default)]
pub struct MethodSpec {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

/// `{from, to}` chaining constraint; `from == "*"` matches any predecessor.
#[derive(Debug, Clone)]
pub struct ChainingRule {
    pub from: String,
    pub to: String,
}

impl ChainingRule {
    #[must_use]
    pub fn matches(&self, prev: Option<&str>, current: &str) -> bool {
        self.to == current && (self.from == "*" || prev == Some(self.from.as_str()))
    }
}
