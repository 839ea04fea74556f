//! Bounded least-recently-used cache of key conversions.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::constants::cache::{DEFAULT_CAPACITY, MAX_CACHEABLE_KEY_LENGTH};

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

struct CacheEntry {
    value: String,
    last_used: u64,
}

#[derive(Default)]
struct LruState {
    entries: HashMap<String, CacheEntry>,
    /// last_used tick → key, oldest first
    recency: BTreeMap<u64, String>,
    tick: u64,
}

impl LruState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, key: &str) -> Option<String> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.last_used);
        entry.last_used = tick;
        self.recency.insert(tick, key.to_string());
        Some(entry.value.clone())
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Thread-safe memo of `cache key → converted key`.
///
/// Capacity and the maximum cacheable source-key length are fixed at
/// construction. Inserting past capacity evicts the least recently used entry.
pub struct ConversionCache {
    state: Mutex<LruState>,
    capacity: usize,
    max_key_length: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ConversionCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_limits(capacity, MAX_CACHEABLE_KEY_LENGTH)
    }

    /// Create a cache that refuses source keys of `max_key_length` characters or more.
    pub fn with_limits(capacity: usize, max_key_length: usize) -> Self {
        Self {
            state: Mutex::new(LruState::default()),
            capacity,
            max_key_length,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    /// Whether conversions of `source_key` may be stored.
    pub fn accepts(&self, source_key: &str) -> bool {
        source_key.chars().count() < self.max_key_length
    }

    /// Look up a conversion, marking it as most recently used.
    pub fn get(&self, cache_key: &str) -> Option<String> {
        let found = self.state.lock().touch(cache_key);
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn contains(&self, cache_key: &str) -> bool {
        self.state.lock().entries.contains_key(cache_key)
    }

    /// Store a conversion. Returns false when the cache has zero capacity.
    pub fn insert(&self, cache_key: String, value: String) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let tick = state.next_tick();

        if let Some(entry) = state.entries.get_mut(&cache_key) {
            let previous = entry.last_used;
            entry.value = value;
            entry.last_used = tick;
            state.recency.remove(&previous);
            state.recency.insert(tick, cache_key);
            return true;
        }

        while state.entries.len() >= self.capacity {
            match state.evict_oldest() {
                Some(evicted) => {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %evicted, "Evicted key conversion");
                }
                None => break,
            }
        }

        state.recency.insert(tick, cache_key.clone());
        state.entries.insert(
            cache_key,
            CacheEntry {
                value,
                last_used: tick,
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.recency.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for ConversionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for ConversionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionCache")
            .field("capacity", &self.capacity)
            .field("max_key_length", &self.max_key_length)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_and_insert() {
        let cache = ConversionCache::new(10);
        assert!(cache.is_empty());
        assert_eq!(cache.get("foo_bar"), None);

        assert!(cache.insert("foo_bar".to_string(), "fooBar".to_string()));
        assert_eq!(cache.get("foo_bar").as_deref(), Some("fooBar"));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ConversionCache::new(2);
        cache.insert("a".to_string(), "A".to_string());
        cache.insert("b".to_string(), "B".to_string());

        // Reading "a" makes "b" the eviction candidate.
        assert!(cache.get("a").is_some());
        cache.insert("c".to_string(), "C".to_string());

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_refreshes_recency() {
        let cache = ConversionCache::new(2);
        cache.insert("a".to_string(), "A".to_string());
        cache.insert("b".to_string(), "B".to_string());
        cache.insert("a".to_string(), "A2".to_string());
        cache.insert("c".to_string(), "C".to_string());

        assert_eq!(cache.get("a").as_deref(), Some("A2"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = ConversionCache::new(0);
        assert!(!cache.insert("a".to_string(), "A".to_string()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_length_limit() {
        let cache = ConversionCache::default();
        assert_eq!(cache.capacity(), 100_000);
        assert!(cache.accepts(&"a".repeat(99)));
        assert!(!cache.accepts(&"a".repeat(100)));
        assert!(!cache.accepts(&"a".repeat(250)));
    }

    #[test]
    fn test_bounded_under_concurrent_inserts() {
        let cache = Arc::new(ConversionCache::new(64));

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for i in 0..500 {
                        let key = format!("key_{worker}_{i}");
                        cache.insert(key.clone(), key.to_uppercase());
                        let _ = cache.get(&key);
                    }
                });
            }
        });

        assert_eq!(cache.len(), 64);
        assert_eq!(cache.stats().evictions, 8 * 500 - 64);
    }

    #[test]
    fn test_clear() {
        let cache = ConversionCache::new(4);
        cache.insert("a".to_string(), "A".to_string());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
