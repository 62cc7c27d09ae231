//! Process-local hash cache.

use super::{CacheBackend, CacheEntry, CacheStats};
use crate::error::CacheError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

type CacheKey = (String, String);

/// Hash cache held for the life of one process.
///
/// Shared by reference across parallel page evaluations. When a bound is
/// set, storing a new key into a full cache first drops stale entries and
/// then the oldest one.
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    max_age: Option<Duration>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCache {
    /// Unbounded, entries never expire
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age: None,
            max_entries: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Entries older than `max_age` are treated as absent
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Hold at most `max_entries` hashes (at least one)
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    fn make_room(&self, entries: &mut HashMap<CacheKey, CacheEntry>, limit: usize) {
        let now = SystemTime::now();
        entries.retain(|_, entry| entry.is_fresh(self.max_age, now));

        while entries.len() >= limit {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.cached_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for InMemoryCache {
    fn get(&self, source: &str, algorithm: &str) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;

        let key = (source.to_string(), algorithm.to_string());
        let found = entries
            .get(&key)
            .filter(|entry| entry.is_fresh(self.max_age, SystemTime::now()))
            .cloned();

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };

        Ok(found)
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;

        let key = (entry.source.clone(), entry.algorithm.clone());
        if let Some(limit) = self.max_entries {
            if !entries.contains_key(&key) && entries.len() >= limit {
                self.make_room(&mut entries, limit);
            }
        }
        entries.insert(key, entry);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;

        entries.clear();
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;

        Ok(CacheStats {
            total_entries: entries.len(),
            total_size_bytes: entries.values().map(|e| e.hash.len() as u64).sum(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}
