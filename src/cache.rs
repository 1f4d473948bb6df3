//! Bounded TTL cache with least-recently-used eviction.
//!
//! Safe to share between threads; every operation takes a short internal lock.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hits over lookups, 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

struct Inner<K: Hash + Eq, V> {
    entries: LruCache<K, (V, Instant)>,
    stats: CacheStats,
}

pub struct TtlCache<K: Hash + Eq, V> {
    inner: Mutex<Inner<K, V>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`; expired entries are dropped and count as misses.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        let lookup = inner
            .entries
            .get(key)
            .map(|(value, stored)| (value.clone(), stored.elapsed() >= self.ttl));

        match lookup {
            Some((value, false)) => {
                inner.stats.hits += 1;
                Some(value)
            }
            Some((_, true)) => {
                inner.entries.pop(key);
                inner.stats.expirations += 1;
                inner.stats.misses += 1;
                None
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.lock();
        let replacing = inner.entries.contains(&key);
        if inner.entries.push(key, (value, Instant::now())).is_some() && !replacing {
            inner.stats.evictions += 1;
        }
    }

    /// Remove one entry; returns whether it was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().entries.pop(key).is_some()
    }

    /// Remove every entry whose key satisfies `predicate`.
    pub fn invalidate_where<F: Fn(&K) -> bool>(&self, predicate: F) -> usize {
        let mut inner = self.lock();
        retain_entries(&mut inner.entries, |key, _| !predicate(key))
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.stats = CacheStats::default();
    }

    /// Drop expired entries; returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut inner = self.lock();
        let expired = retain_entries(&mut inner.entries, |_, (_, stored)| stored.elapsed() < ttl);
        inner.stats.expirations += expired as u64;
        expired
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            size: inner.entries.len(),
            capacity: inner.entries.cap().get(),
            ..inner.stats
        }
    }
}

/// Keep entries for which `keep` holds, preserving recency order.
fn retain_entries<K: Hash + Eq, V, F>(entries: &mut LruCache<K, V>, mut keep: F) -> usize
where
    F: FnMut(&K, &V) -> bool,
{
    let mut kept = Vec::with_capacity(entries.len());
    let mut removed = 0;
    while let Some((key, value)) = entries.pop_lru() {
        if keep(&key, &value) {
            kept.push((key, value));
        } else {
            removed += 1;
        }
    }
    // least recently used first, so the last put ends up most recent
    for (key, value) in kept {
        entries.put(key, value);
    }
    removed
}
