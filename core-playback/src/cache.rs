//! # Buffer Cache
//!
//! Populate-once lookup table from [`MediaId`] to decoded audio.
//!
//! Entries are never evicted; a long session that plays many distinct tracks
//! keeps every decoded buffer in memory. Concurrent misses for the same id are
//! not coalesced here, the engine's generation counter decides which load
//! result gets played.

use bridge_traits::{DecodedBuffer, MediaId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when nothing was looked up).
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}

/// Decoded buffers keyed by media id.
#[derive(Debug, Default)]
pub struct BufferCache {
    entries: RwLock<HashMap<MediaId, Arc<DecodedBuffer>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a buffer, counting the hit or miss.
    pub fn get(&self, id: &MediaId) -> Option<Arc<DecodedBuffer>> {
        let found = self.entries.read().get(id).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a buffer. Inserting an existing id replaces the previous buffer.
    pub fn insert(&self, id: MediaId, buffer: Arc<DecodedBuffer>) {
        self.entries.write().insert(id, buffer);
    }

    /// Membership test that does not touch the hit/miss counters.
    pub fn contains(&self, id: &MediaId) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(secs: f64) -> Arc<DecodedBuffer> {
        Arc::new(DecodedBuffer::with_duration(secs))
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = BufferCache::new();
        let id = MediaId::from("track-1");

        assert!(cache.get(&id).is_none());
        cache.insert(id.clone(), buffer(3.0));

        let hit = cache.get(&id).unwrap();
        assert_eq!(hit.duration_secs(), 3.0);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
        assert_eq!(cache.stats().hit_ratio(), 0.5);
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = BufferCache::new();
        let id = MediaId::from("track-1");

        cache.insert(id.clone(), buffer(1.0));
        cache.insert(id.clone(), buffer(2.0));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&id).unwrap().duration_secs(), 2.0);
    }

    #[test]
    fn test_contains_does_not_count() {
        let cache = BufferCache::new();
        assert!(cache.is_empty());
        assert!(!cache.contains(&MediaId::from("nope")));

        cache.insert(MediaId::from("a"), buffer(1.0));
        assert!(cache.contains(&MediaId::from("a")));
        assert_eq!(cache.stats().hits + cache.stats().misses, 0);
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(BufferCache::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.insert(MediaId::new(format!("track-{i}")), buffer(i as f64));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 4);
    }
}
