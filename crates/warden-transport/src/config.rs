//! Top-level construction-time configuration for [`crate::Warden`], composing
//! each layer crate's own config type into one struct.

use serde::{Deserialize, Serialize};
use warden_behavior::BehaviorConfig;
use warden_policy::PolicyConfig;
use warden_proto::SideEffectPolicy;
use warden_sanitizer::{SanitizerConfig, SanitizerMode};
use warden_structure::StructureConfig;

/// Analogous to a `SecureMcpServer(serverInfo, options)` constructor's
/// options argument.
#[derive(Clone)]
pub struct WardenConfig {
    pub structure: StructureConfig,
    pub behavior: BehaviorConfig,
    pub policy: PolicyConfig,
    pub sanitizer: SanitizerConfig,
    /// Capability flags granted to every request handled by this `Warden`
    /// (`context.policy`'s `allowNetwork`/`allowWrites`).
    pub default_policy: SideEffectPolicy,
    /// Whether the optional L5 contextual layer runs at all. When `false`,
    /// `Warden::contextual()` still returns a usable handle, but it is never
    /// consulted by the pipeline.
    pub enable_contextual: bool,
    /// Base directory `resources/read`'s relative paths resolve against.
    pub base_dir: Option<std::path::PathBuf>,
    /// How often the behavior layer and quota provider sweep stale state.
    pub sweep_interval: std::time::Duration,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            structure: StructureConfig::default(),
            behavior: BehaviorConfig::default(),
            policy: PolicyConfig::default(),
            sanitizer: SanitizerConfig::default(),
            default_policy: SideEffectPolicy::default(),
            enable_contextual: true,
            base_dir: None,
            sweep_interval: std::time::Duration::from_secs(60),
        }
    }
}

/// Convenience constructor matching enumerated `options`: production
/// defaults, development-mode sanitizer messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum WardenMode {
    #[default]
    Production,
    Development,
}

impl WardenConfig {
    #[must_use]
    pub fn with_mode(mut self, mode: WardenMode) -> Self {
        self.sanitizer.mode = match mode {
            WardenMode::Production => SanitizerMode::Production,
            WardenMode::Development => SanitizerMode::Development,
        };
        self
    }
}
