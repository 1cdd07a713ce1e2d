//! The per-message context threaded through the validation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side-effect capability flags a host grants to the current request.
///
/// `read` is implicitly always allowed; `write` and `network` gate tools
/// whose [`ToolSpec::side_effects`](warden_policy) require them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SideEffectPolicy {
    pub allow_network: bool,
    pub allow_writes: bool,
}

/// Context accompanying a [`Message`](crate::Message) through the pipeline.
///
/// # Invariant
///
/// `canonical`, once set by the content layer, is identical across every
/// subsequent layer invocation for this message. No layer after L2 may
/// overwrite it.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<String>,
    pub client_id: Option<String>,
    pub transport_level: bool,
    pub policy: SideEffectPolicy,
    pub canonical: Option<String>,
    pub base_dir: Option<std::path::PathBuf>,
}

impl ValidationContext {
    /// Creates a new context stamped with the current time.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            session_id: None,
            client_id: None,
            transport_level: true,
            policy: SideEffectPolicy::default(),
            canonical: None,
            base_dir: None,
        }
    }

    /// Session key used by session memory and contextual validators:
    /// `sessionId ?? clientId ?? "global"`.
    #[must_use]
    pub fn session_key(&self) -> &str {
        self.session_id
            .as_deref()
            .or(self.client_id.as_deref())
            .unwrap_or("global")
    }

    /// Records the canonical form for downstream reuse.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if called twice with different content — the
    /// canonical form must be set exactly once per message per the pipeline
    /// invariant. Release builds simply keep the first value.
    pub fn set_canonical(&mut self, canonical: String) {
        debug_assert!(
            self.canonical.as_ref().map_or(true, |c| c == &canonical),
            "canonical form must not change once set"
        );
        if self.canonical.is_none() {
            self.canonical = Some(canonical);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_prefers_session_id() {
        let mut ctx = ValidationContext::new(Utc::now());
        ctx.client_id = Some("client-1".into());
        assert_eq!(ctx.session_key(), "client-1");
        ctx.session_id = Some("sess-1".into());
        assert_eq!(ctx.session_key(), "sess-1");
    }

    #[test]
    fn session_key_defaults_to_global() {
        let ctx = ValidationContext::new(Utc::now());
        assert_eq!(ctx.session_key(), "global");
    }

    #[test]
    fn canonical_set_once() {
        let mut ctx = ValidationContext::new(Utc::now());
        ctx.set_canonical("a".into());
        ctx.set_canonical("b".into());
        assert_eq!(ctx.canonical.as_deref(), Some("a"));
    }
}
