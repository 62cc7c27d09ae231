//! Cache backend trait definition.

use super::{CacheEntry, CacheStats};
use crate::error::CacheError;

/// Trait for cache backends
pub trait CacheBackend: Send + Sync {
    /// Get a cached hash for a thumbnail source, if present and fresh
    fn get(&self, source: &str, algorithm: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Store a hash in the cache
    fn set(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Clear all cached entries
    fn clear(&self) -> Result<(), CacheError>;

    /// Get cache statistics
    fn stats(&self) -> Result<CacheStats, CacheError>;
}
