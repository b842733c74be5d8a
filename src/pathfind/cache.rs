use std::{
    cmp::Reverse,
    hash::{Hash, Hasher},
    sync::{Mutex, MutexGuard, PoisonError, atomic::{AtomicU64, Ordering}},
};

use priority_queue::PriorityQueue;

use crate::{
    log,
    utils::{
        coords::Cell,
        hash::{FNV1aHasher, PreHashedBuildHasher, PreHashedKeyMap},
    },
};

use super::DestinationSet;

// ----------------------------------------------
// CacheKey
// ----------------------------------------------

#[derive(Clone, PartialEq, Eq)]
struct CacheKey {
    origin: Cell,
    destinations: DestinationSet,
}

// Writes a single u64 so the key can live in a PreHashedKeyMap.
impl Hash for CacheKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut hasher = FNV1aHasher::new();
        hasher.write_i32(self.origin.x);
        hasher.write_i32(self.origin.y);
        hasher.mix_u64(self.destinations.hash_value());
        state.write_u64(hasher.finish());
    }
}

// ----------------------------------------------
// HeuristicCache
// ----------------------------------------------

struct LruEntries {
    values: PreHashedKeyMap<CacheKey, f64>,

    // Oldest access pops first.
    recency: PriorityQueue<CacheKey, Reverse<u64>, PreHashedBuildHasher>,
    clock: u64,
}

impl LruEntries {
    #[inline]
    fn tick(&mut self) -> Reverse<u64> {
        self.clock += 1;
        Reverse(self.clock)
    }
}

// Bounded least-recently-used memo of heuristic values, keyed by
// (origin, destination set). Safe to share between threads.
// A capacity of zero disables caching entirely.
pub struct HeuristicCache {
    capacity: usize,
    entries: Mutex<LruEntries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HeuristicCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(LruEntries {
                values: PreHashedKeyMap::default(),
                recency: PriorityQueue::with_default_hasher(),
                clock: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn disabled() -> Self {
        Self::new(0)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.capacity != 0
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.values.clear();
        entries.recency.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn get(&self, origin: Cell, destinations: &DestinationSet) -> Option<f64> {
        if !self.is_enabled() {
            return None;
        }

        let key = CacheKey { origin, destinations: destinations.clone() };
        let mut entries = self.lock();

        let Some(&value) = entries.values.get(&key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let recent = entries.tick();
        entries.recency.change_priority(&key, recent);
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(value)
    }

    pub fn insert(&self, origin: Cell, destinations: &DestinationSet, value: f64) {
        if !self.is_enabled() {
            return;
        }

        let key = CacheKey { origin, destinations: destinations.clone() };
        let mut entries = self.lock();

        if !entries.values.contains_key(&key) && entries.values.len() >= self.capacity {
            if let Some((evicted, _)) = entries.recency.pop() {
                entries.values.remove(&evicted);
            }
        }

        let recent = entries.tick();
        entries.values.insert(key.clone(), value);
        entries.recency.push(key, recent);
    }

    // Looks up a value, computing and caching it on a miss.
    // The computation runs without holding the lock; two threads racing on
    // the same key both compute and the second insert simply refreshes it.
    pub fn get_or_insert_with<F>(&self, origin: Cell, destinations: &DestinationSet, compute_fn: F) -> f64
        where F: FnOnce() -> f64
    {
        if let Some(value) = self.get(origin, destinations) {
            return value;
        }
        let value = compute_fn();
        self.insert(origin, destinations, value);
        value
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, LruEntries> {
        // Entries are plain values; a panic mid-update can at worst leave a stale
        // entry behind, so keep using the cache after a poisoning.
        self.entries.lock().unwrap_or_else(|err: PoisonError<_>| {
            log::warn!(log::channel!("cache"), "Heuristic cache lock was poisoned, recovering.");
            err.into_inner()
        })
    }
}
