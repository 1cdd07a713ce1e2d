//! The small TTL-keyed store validators use for cross-request
//! memory, e.g. per-session rate shaping. Entries expire on read: a read
//! past its TTL both returns `None` and removes the entry, rather than
//! waiting for a separate sweep.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;

struct Entry {
    value: Value,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ContextStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl ContextStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_context(&self, key: impl Into<String>, value: Value, ttl_ms: i64, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().expect("context store mutex poisoned");
        entries.insert(key.into(), Entry { value, expires_at: now + chrono::Duration::milliseconds(ttl_ms) });
    }

    #[must_use]
    pub fn get_context(&self, key: &str, now: DateTime<Utc>) -> Option<Value> {
        let mut entries = self.entries.lock().expect("context store mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_round_trips() {
        let store = ContextStore::new();
        let now = Utc::now();
        store.set_context("k", json!({"count": 1}), 1_000, now);
        assert_eq!(store.get_context("k", now), Some(json!({"count": 1})));
    }

    #[test]
    fn expired_entry_is_removed_on_read() {
        let store = ContextStore::new();
        let t0 = Utc::now();
        store.set_context("k", json!(1), 1_000, t0);
        let later = t0 + chrono::Duration::milliseconds(1_001);
        assert_eq!(store.get_context("k", later), None);
        assert_eq!(store.get_context("k", later), None);
    }
}
