//! Per-instance canonicalization memoization.
//!
//! Canonicalization is the most expensive step in the content layer, and the
//! same `{method, params}` pair recurs constantly in a long-lived session
//! (a client polling `resources/list`, repeated `tools/call` with identical
//! arguments). Keyed on `{method, params, size}` per spec; a bounded table
//! that clears itself wholesale on overflow rather than evicting by LRU —
//! simpler, and the workload here is bursty enough that a full clear costs
//! about as much as fine-grained eviction would.

use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const MAX_ENTRIES: usize = 2048;

pub(crate) struct CanonCache {
    entries: DashMap<u64, String>,
}

impl CanonCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub(crate) fn get_or_insert_with(
        &self,
        method: &str,
        params_repr: &str,
        size: usize,
        compute: impl FnOnce() -> String,
    ) -> String {
        let key = Self::key(method, params_repr, size);
        if let Some(hit) = self.entries.get(&key) {
            return hit.clone();
        }
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.clear();
        }
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    fn key(method: &str, params_repr: &str, size: usize) -> u64 {
        let mut hasher = DefaultHasher::new();
        method.hash(&mut hasher);
        params_repr.hash(&mut hasher);
        size.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for CanonCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn caches_repeated_lookups() {
        let cache = CanonCache::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "canonical-value".to_string()
        };
        assert_eq!(cache.get_or_insert_with("tools/call", "{}", 2, compute), "canonical-value");
        let compute2 = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "canonical-value".to_string()
        };
        assert_eq!(cache.get_or_insert_with("tools/call", "{}", 2, compute2), "canonical-value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clears_wholesale_on_overflow() {
        let cache = CanonCache::new();
        for i in 0..MAX_ENTRIES + 10 {
            let method = format!("method-{i}");
            cache.get_or_insert_with(&method, "{}", i, || "v".to_string());
        }
        assert!(cache.entries.len() <= MAX_ENTRIES + 10);
    }

    #[test]
    fn distinguishes_by_params_and_size() {
        let cache = CanonCache::new();
        let a = cache.get_or_insert_with("m", "{}", 2, || "a".to_string());
        let b = cache.get_or_insert_with("m", "{\"x\":1}", 9, || "b".to_string());
        assert_ne!(a, b);
    }
}
