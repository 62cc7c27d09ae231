//! # Cache Module
//!
//! Memoizes thumbnail hashes so the same image is fetched and hashed once.
//!
//! The same thumbnail (a blog avatar, a law-firm logo) shows up on the
//! result pages of many different queries in one run. Entries are keyed by
//! the thumbnail's source plus the hash algorithm name.
//!
//! ## Backends
//! - `InMemoryCache` - Process-wide, optionally bounded by entry age

mod memory;
mod traits;

pub use memory::InMemoryCache;
pub use traits::CacheBackend;

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// A cached hash entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Thumbnail source (path or URL)
    pub source: String,
    /// Algorithm that produced the hash
    pub algorithm: String,
    /// The computed hash
    pub hash: Vec<u8>,
    /// When the entry was cached
    pub cached_at: SystemTime,
}

impl CacheEntry {
    pub fn new(source: impl Into<String>, algorithm: impl Into<String>, hash: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            algorithm: algorithm.into(),
            hash,
            cached_at: SystemTime::now(),
        }
    }

    /// Check if this entry may still be served
    pub fn is_fresh(&self, max_age: Option<Duration>, now: SystemTime) -> bool {
        match max_age {
            None => true,
            // An entry from the future (clock skew) counts as age zero
            Some(max_age) => now
                .duration_since(self.cached_at)
                .map(|age| age <= max_age)
                .unwrap_or(true),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Total size of cached data in bytes
    pub total_size_bytes: u64,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that missed
    pub misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_without_max_age_is_always_fresh() {
        let entry = CacheEntry::new("https://img/a.png", "pHash", vec![0xFF]);
        let much_later = entry.cached_at + Duration::from_secs(86_400 * 365);
        assert!(entry.is_fresh(None, much_later));
    }

    #[test]
    fn entry_expires_after_max_age() {
        let entry = CacheEntry::new("https://img/a.png", "pHash", vec![0xFF]);
        let later = entry.cached_at + Duration::from_secs(120);

        assert!(entry.is_fresh(Some(Duration::from_secs(300)), later));
        assert!(!entry.is_fresh(Some(Duration::from_secs(60)), later));
    }
}
