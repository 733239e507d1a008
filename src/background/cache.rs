//! Bounded variant cache
//!
//! Variants are keyed by their relative request URL and evicted least recently
//! used first once the capacity is reached. Entries are shared through `Arc`, so
//! an evicted body stays alive until the last surface layer showing it is dropped.

use super::variant::ImageVariant;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct VariantCache {
    capacity: usize,
    entries: Cache<String, Arc<ImageVariant>>,
    /// Filled by the eviction listener, drained by `insert`.
    evicted: Arc<Mutex<Vec<Arc<ImageVariant>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: Arc<AtomicU64>,
}

impl VariantCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let evictions = Arc::new(AtomicU64::new(0));

        let listener_evicted = evicted.clone();
        let listener_evictions = evictions.clone();
        let entries = Cache::builder()
            .max_capacity(capacity as u64)
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(
                move |_key: Arc<String>, variant: Arc<ImageVariant>, cause: RemovalCause| {
                    if cause.was_evicted() {
                        listener_evictions.fetch_add(1, Ordering::Relaxed);
                        listener_evicted.lock().push(variant);
                    }
                },
            )
            .build();

        Self {
            capacity,
            entries,
            evicted,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions,
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<ImageVariant>> {
        let found = self.entries.get(key);
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert or replace `key`, returning the variant evicted to make room.
    pub fn insert(&self, key: String, variant: Arc<ImageVariant>) -> Option<Arc<ImageVariant>> {
        self.entries.insert(key, variant);
        // Apply the capacity bound now rather than on a later access.
        self.entries.run_pending_tasks();
        let mut evicted = self.evicted.lock();
        if evicted.is_empty() {
            None
        } else {
            Some(evicted.remove(0))
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
