//! Bounded least-recently-used cache for interpretation results.
//!
//! Key properties:
//! - get/put/remove are O(1): a hash index over a slab of nodes that
//!   form a doubly linked recency list
//! - Most recently used entry at the head, eviction from the tail
//! - An optional callback observes every capacity eviction

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

// ═══════════════════════════════════════════════════════════
// Node: one slab slot
// ═══════════════════════════════════════════════════════════

struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Called with the evicted key and value.
pub type EvictionCallback<K, V> = Box<dyn FnMut(&K, &V) + Send>;

// ═══════════════════════════════════════════════════════════
// LruCache
// ═══════════════════════════════════════════════════════════

pub struct LruCache<K, V> {
    capacity: usize,
    index: HashMap<K, usize>,
    slab: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evict: Option<EvictionCallback<K, V>>,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create an empty cache. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            index: HashMap::with_capacity(capacity),
            slab: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            on_evict: None,
        }
    }

    /// Install the eviction hook.
    pub fn with_eviction_callback(mut self, callback: EvictionCallback<K, V>) -> Self {
        self.on_evict = Some(callback);
        self
    }

    // ── Lookups ──────────────────────────────────────────

    /// Get a value and promote it to most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.node(idx).map(|n| &n.value)
    }

    /// Get a value without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.node(idx).map(|n| &n.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    // ── Mutation ─────────────────────────────────────────

    /// Insert or replace a value as most recently used. Evicts the least
    /// recently used entry when a new key would exceed capacity.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(node) = self.slab[idx].as_mut() {
                node.value = value;
            }
            self.move_to_front(idx);
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict_tail();
        }

        let node = Node { key: key.clone(), value, prev: None, next: None };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slab[idx] = Some(node);
                idx
            }
            None => {
                self.slab.push(Some(node));
                self.slab.len() - 1
            }
        };
        self.index.insert(key, idx);
        self.push_front(idx);
    }

    /// Remove an entry without calling the eviction hook.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.unlink(idx);
        self.free.push(idx);
        self.slab[idx].take().map(|n| n.value)
    }

    /// Drop every entry. The eviction hook is not called.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slab.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(node) = self.node(idx) else { break };
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }

    // ── Linked list plumbing ─────────────────────────────

    fn node(&self, idx: usize) -> Option<&Node<K, V>> {
        self.slab.get(idx).and_then(Option::as_ref)
    }

    fn evict_tail(&mut self) {
        let Some(idx) = self.tail else { return };
        self.unlink(idx);
        self.free.push(idx);
        if let Some(node) = self.slab[idx].take() {
            self.index.remove(&node.key);
            if let Some(callback) = self.on_evict.as_mut() {
                callback(&node.key, &node.value);
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(n) => (n.prev, n.next),
            None => return,
        };
        match prev {
            Some(p) => {
                if let Some(n) = self.slab[p].as_mut() {
                    n.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(nx) => {
                if let Some(n) = self.slab[nx].as_mut() {
                    n.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        if let Some(n) = self.slab[idx].as_mut() {
            n.prev = None;
            n.next = None;
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(n) = self.slab[idx].as_mut() {
            n.prev = None;
            n.next = old_head;
        }
        if let Some(h) = old_head {
            if let Some(n) = self.slab[h].as_mut() {
                n.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.index.len())
            .field("has_eviction_callback", &self.on_evict.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
