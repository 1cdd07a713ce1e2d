//! C6 — session memory: an LRU cache with a per-entry TTL, used by the
//! semantic layer to remember per-session state (e.g. the last tool method
//! called, for the optional method-chaining check).
//!
//! `get`/`set`/`cleanup` are all O(1) amortized, using a periodic-sweep-with-TTL
//! approach. The eviction order — an intrusive doubly linked list over a slot
//! arena — is hand-rolled rather than pulling in the `lru` crate for a few
//! dozen lines of bookkeeping.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};

struct Node<K, V> {
    key: K,
    value: V,
    expires_at: DateTime<Utc>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU-ordered map bounded to `max_entries`, where every entry also expires
/// after `ttl` regardless of how recently it was touched.
pub struct SessionMemory<K, V> {
    max_entries: usize,
    ttl: Duration,
    index: HashMap<K, usize>,
    arena: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K: Eq + Hash + Clone, V: Clone> SessionMemory<K, V> {
    #[must_use]
    pub fn new(max_entries: usize, ttl_ms: i64) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ttl: Duration::milliseconds(ttl_ms),
            index: HashMap::new(),
            arena: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Returns the value for `key`, refreshing it to most-recently-used, or
    /// `None` if the key is absent or its entry has expired (an expired
    /// entry is evicted immediately, not left for the next `cleanup`).
    pub fn get(&mut self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let slot = *self.index.get(key)?;
        let expired = self.arena[slot].as_ref().is_none_or(|n| n.expires_at <= now);
        if expired {
            self.evict(slot);
            self.index.remove(key);
            return None;
        }
        self.detach(slot);
        self.push_front(slot);
        self.arena[slot].as_ref().map(|n| n.value.clone())
    }

    /// Inserts or refreshes `key`, evicting the least-recently-used entry
    /// first if the map is at capacity and `key` is new.
    pub fn set(&mut self, key: K, value: V, now: DateTime<Utc>) {
        if let Some(&slot) = self.index.get(&key) {
            self.detach(slot);
            if let Some(node) = &mut self.arena[slot] {
                node.value = value;
                node.expires_at = now + self.ttl;
            }
            self.push_front(slot);
            return;
        }
        if self.index.len() >= self.max_entries {
            self.evict_lru();
        }
        let node = Node {
            key: key.clone(),
            value,
            expires_at: now + self.ttl,
            prev: None,
            next: None,
        };
        let slot = self.alloc(node);
        self.index.insert(key, slot);
        self.push_front(slot);
    }

    /// Drops every entry whose TTL has elapsed as of `now`.
    pub fn cleanup(&mut self, now: DateTime<Utc>) {
        let expired: Vec<K> = self
            .index
            .iter()
            .filter(|(_, &slot)| self.arena[slot].as_ref().is_none_or(|n| n.expires_at <= now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            if let Some(slot) = self.index.remove(&key) {
                self.evict(slot);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        if let Some(slot) = self.free.pop() {
            self.arena[slot] = Some(node);
            slot
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    /// Unlinks `slot` from the LRU list and returns its arena cell to the
    /// free list. Does not touch `index` — callers remove the key themselves.
    fn evict(&mut self, slot: usize) {
        self.detach(slot);
        self.arena[slot] = None;
        self.free.push(slot);
    }

    fn evict_lru(&mut self) {
        let Some(tail) = self.tail else { return };
        if let Some(key) = self.arena[tail].as_ref().map(|n| n.key.clone()) {
            self.evict(tail);
            self.index.remove(&key);
        }
    }

    fn detach(&mut self, slot: usize) {
        let Some((prev, next)) = self.arena[slot].as_ref().map(|n| (n.prev, n.next)) else {
            return;
        };
        match prev {
            Some(p) => {
                if let Some(n) = &mut self.arena[p] {
                    n.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n2) => {
                if let Some(n) = &mut self.arena[n2] {
                    n.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        if let Some(n) = &mut self.arena[slot] {
            n.prev = None;
            n.next = None;
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(n) = &mut self.arena[slot] {
            n.next = old_head;
            n.prev = None;
        }
        if let Some(h) = old_head {
            if let Some(n) = &mut self.arena[h] {
                n.prev = Some(slot);
            }
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}
