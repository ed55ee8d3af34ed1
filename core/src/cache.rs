//! Content-addressed memoization shared by segmentation, indexing and
//! scoring.
//!
//! Keys are an operation tag plus a SHA-1 digest of the canonicalized inputs,
//! so identical inputs always hit the same entry. Values are pure functions
//! of their key, which makes concurrent last-writer-wins insertion safe.
//! Entries are evicted FIFO once the configured bound is exceeded.

use crate::index::{DocumentIndex, Sentence};
use crate::score::lcs::RougeMetrics;
use crate::score::meteor::MeteorOutcome;
use dashmap::DashMap;
use parking_lot::Mutex;
use sha1::{Digest, Sha1};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Operation tag namespacing the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Segment,
    IndexBuild,
    RougeScore,
    MeteorScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    op: Op,
    digest: [u8; 20],
}

impl CacheKey {
    pub fn new(op: Op, input: &[u8]) -> Self {
        Self::of_parts(op, &[input])
    }

    /// Digest over length-prefixed parts, so `["ab","c"]` and `["a","bc"]`
    /// never collide.
    pub fn of_parts(op: Op, parts: &[&[u8]]) -> Self {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self {
            op,
            digest: hasher.finalize().into(),
        }
    }
}

/// Memoized results. Cheap to clone: large payloads are behind `Arc`.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Sentences(Arc<Vec<Sentence>>),
    Index(Arc<DocumentIndex>),
    Rouge(RougeMetrics),
    Meteor(MeteorOutcome),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct ContentCache {
    entries: DashMap<CacheKey, CachedValue>,
    order: Mutex<VecDeque<CacheKey>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ContentCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert, evicting oldest entries past the capacity bound. Concurrent
    /// inserts under the same key may race; either value is valid.
    pub fn insert(&self, key: CacheKey, value: CachedValue) {
        if self.entries.insert(key, value).is_none() {
            let mut order = self.order.lock();
            order.push_back(key);
            while order.len() > self.capacity {
                if let Some(oldest) = order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
    }

    /// Drop every memoized entry. Idempotent.
    pub fn reset(&self) {
        self.entries.clear();
        self.order.lock().clear();
        tracing::debug!("content cache reset");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::with_capacity(crate::config::DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rouge(p: f32) -> CachedValue {
        CachedValue::Rouge(RougeMetrics {
            precision: p,
            recall: p,
            f_measure: p,
            lcs_length: 0.0,
        })
    }

    #[test]
    fn identical_inputs_share_a_key() {
        let a = CacheKey::new(Op::Segment, b"some text");
        let b = CacheKey::new(Op::Segment, b"some text");
        assert_eq!(a, b);
    }

    #[test]
    fn tags_namespace_the_digest() {
        let a = CacheKey::new(Op::Segment, b"x");
        let b = CacheKey::new(Op::IndexBuild, b"x");
        assert_ne!(a, b);
    }

    #[test]
    fn part_boundaries_are_canonical() {
        let a = CacheKey::of_parts(Op::RougeScore, &[b"ab", b"c"]);
        let b = CacheKey::of_parts(Op::RougeScore, &[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn eviction_is_bounded_fifo() {
        let cache = ContentCache::with_capacity(2);
        let k1 = CacheKey::new(Op::RougeScore, b"1");
        let k2 = CacheKey::new(Op::RougeScore, b"2");
        let k3 = CacheKey::new(Op::RougeScore, b"3");
        cache.insert(k1, rouge(0.1));
        cache.insert(k2, rouge(0.2));
        cache.insert(k3, rouge(0.3));
        assert!(cache.get(&k1).is_none(), "oldest entry evicted");
        assert!(cache.get(&k3).is_some());
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn reset_clears_everything() {
        let cache = ContentCache::with_capacity(8);
        cache.insert(CacheKey::new(Op::RougeScore, b"1"), rouge(0.5));
        cache.reset();
        cache.reset(); // idempotent
        assert_eq!(cache.stats().entries, 0);
    }
}
