//! Bounded, thread-safe embedding cache keyed by a hash of the text prefix.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash as _, Hasher as _};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use sieve_core::CacheConfig;

use super::Embedding;

/// Least-recently-used embedding cache.
///
/// Reads promote an entry; inserting beyond capacity evicts the entry that
/// was used longest ago.
pub struct EmbeddingCache {
    entries: Mutex<LruCache<u64, Embedding>>,
    key_chars: usize,
}

impl EmbeddingCache {
    /// Create a cache holding at most `config.capacity` vectors
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            key_chars: config.key_chars,
        }
    }

    /// Cache key for `text`: hash of its first `key_chars` characters
    pub fn key(&self, text: &str) -> u64 {
        let prefix_end = text
            .char_indices()
            .nth(self.key_chars)
            .map_or(text.len(), |(offset, _)| offset);
        let mut hasher = DefaultHasher::new();
        text[..prefix_end].hash(&mut hasher);
        hasher.finish()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<u64, Embedding>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a vector, marking it as recently used
    pub fn get(&self, key: u64) -> Option<Embedding> {
        self.lock().get(&key).cloned()
    }

    /// Store a vector, evicting the least recently used entry when full
    pub fn insert(&self, key: u64, embedding: Embedding) {
        self.lock().put(key, embedding);
    }

    /// Number of cached vectors
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no vectors
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of cached vectors
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Drop every cached vector
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
