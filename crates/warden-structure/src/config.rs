//! Construction-time limits for the structure layer.

use serde::{Deserialize, Serialize};

/// Tunable limits for [`crate::StructureLayer`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Minimum serialized message size, in bytes.
    pub min_bytes: usize,
    /// Maximum serialized message size, in bytes.
    pub max_bytes: usize,
    /// Maximum top-level entries in `params` when it is an object or array.
    pub max_params_entries: usize,
    /// Maximum length, in chars, of any string value nested anywhere in `params`.
    pub max_string_leaf_len: usize,
    /// Maximum count of control characters (per [`char::is_control`]) tolerated
    /// in the serialized message before it's treated as an encoding attack.
    pub max_control_chars: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            min_bytes: 10,
            max_bytes: 50_000,
            max_params_entries: 20,
            max_string_leaf_len: 5_000,
            max_control_chars: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_bounds() {
        let cfg = StructureConfig::default();
        assert_eq!(cfg.min_bytes, 10);
        assert_eq!(cfg.max_bytes, 50_000);
        assert_eq!(cfg.max_params_entries, 20);
        assert_eq!(cfg.max_string_leaf_len, 5_000);
        assert_eq!(cfg.max_control_chars, 10);
    }
}
