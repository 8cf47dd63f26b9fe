//! Best-effort in-memory TTL cache.
//!
//! Entries carry a per-insert deadline and are dropped lazily on read. No
//! eviction pressure exists at this scale (a handful of servers).

use dashmap::DashMap;
use std::time::{Duration, Instant};

pub struct TtlCache<V> {
    entries: DashMap<String, (Instant, V)>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            let (deadline, value) = entry.value();
            if *deadline > Instant::now() {
                return Some(value.clone());
            }
        }
        // Stale or missing; drop any stale entry.
        self.entries.remove_if(key, |_, (deadline, _)| *deadline <= Instant::now());
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.entries.insert(key.into(), (Instant::now() + ttl, value));
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fresh_entries() {
        let cache = TtlCache::new();
        cache.insert("k", 42, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(42));
    }

    #[test]
    fn expires_stale_entries() {
        let cache = TtlCache::new();
        cache.insert("k", 42, Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn remove_invalidates() {
        let cache = TtlCache::new();
        cache.insert("k", 1, Duration::from_secs(60));
        cache.remove("k");
        assert_eq!(cache.get("k"), None);
    }
}
