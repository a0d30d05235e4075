//! A bounded key-value cache with time-based expiry.
//!
//! Entries expire a fixed time-to-live after they are written. Expiry is checked lazily: an expired
//! entry reads as absent and is evicted on that read. When the cache is full, writing a new key
//! evicts the entry that was written longest ago, regardless of how recently it was read.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::trace;

/// The default time-to-live for cache entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// The default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 256;

/// A source of monotonic time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The system's monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Capacity and expiry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    written: Instant,
    /// Matches the write stamp of this key's slot in the insertion queue.
    stamp: u64,
}

/// A bounded, expiring key-value store.
#[derive(Debug, Clone)]
pub struct ResultCache<K, V, C = MonotonicClock> {
    config: CacheConfig,
    clock: C,
    entries: HashMap<K, Entry<V>>,
    /// Keys in write order. Slots whose stamp no longer matches the entry are stale and skipped.
    order: VecDeque<(K, u64)>,
    next_stamp: u64,
}

impl<K, V> Default for ResultCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<K, V> ResultCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache that reads the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<K, V, C> ResultCache<K, V, C>
where
    K: Hash + Eq + Clone,
    C: Clock,
{
    /// Creates a cache that reads time from `clock`. A capacity of zero is treated as one.
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        let config = CacheConfig {
            capacity: config.capacity.max(1),
            ..config
        };
        Self {
            config,
            clock,
            entries: HashMap::with_capacity(config.capacity),
            order: VecDeque::with_capacity(config.capacity),
            next_stamp: 0,
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// The number of entries held, including any that have expired but not yet been read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes `value` under `key`, evicting the oldest entry if the cache is full.
    pub fn set(&mut self, key: K, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.capacity {
            self.evict_oldest();
        }
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        let written = self.clock.now();
        self.order.push_back((key.clone(), stamp));
        self.entries.insert(
            key,
            Entry {
                value,
                written,
                stamp,
            },
        );
        self.compact();
    }

    /// Reads the value under `key`, if present and fresh.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.expire(key) {
            return None;
        }
        self.entries.get(key).map(|e| &e.value)
    }

    /// Whether a fresh value is held under `key`.
    pub fn has(&mut self, key: &K) -> bool {
        !self.expire(key) && self.entries.contains_key(key)
    }

    /// Removes the value under `key`, returning it if it was present and fresh.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        if self.expire(key) {
            return None;
        }
        self.entries.remove(key).map(|e| e.value)
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Evicts the entry under `key` if it has outlived the time-to-live. Returns true if it did.
    fn expire(&mut self, key: &K) -> bool {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let expired = self
            .entries
            .get(key)
            .is_some_and(|e| now.saturating_duration_since(e.written) > ttl);
        if expired {
            trace!("cache entry expired");
            self.entries.remove(key);
        }
        expired
    }

    fn evict_oldest(&mut self) {
        while let Some((key, stamp)) = self.order.pop_front() {
            if self.entries.get(&key).is_some_and(|e| e.stamp == stamp) {
                trace!("cache full, evicting oldest entry");
                self.entries.remove(&key);
                return;
            }
        }
    }

    /// Drops stale queue slots once they outnumber live entries.
    fn compact(&mut self) {
        if self.order.len() > 2 * self.config.capacity {
            let entries = &self.entries;
            self.order
                .retain(|(key, stamp)| entries.get(key).is_some_and(|e| e.stamp == *stamp));
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// A clock that only moves when told to.
    #[derive(Debug, Clone)]
    pub(crate) struct ManualClock {
        now: Rc<Cell<Instant>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self {
                now: Rc::new(Cell::new(Instant::now())),
            }
        }
    }

    impl ManualClock {
        pub(crate) fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.now.get()
        }
    }

    fn cache(capacity: usize) -> (ResultCache<&'static str, u32, ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let config = CacheConfig {
            capacity,
            ttl: Duration::from_secs(60),
        };
        (ResultCache::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_set_get_delete() {
        let (mut cache, _) = cache(4);
        assert_eq!(cache.get(&"a"), None);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert!(cache.has(&"b"));
        assert_eq!(cache.delete(&"b"), Some(2));
        assert!(!cache.has(&"b"));
        cache.set("a", 3);
        assert_eq!(cache.get(&"a"), Some(&3));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl() {
        let (mut cache, clock) = cache(4);
        cache.set("a", 1);
        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get(&"a"), Some(&1));
        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_ttl() {
        let clock = ManualClock::default();
        let mut cache = ResultCache::with_clock(CacheConfig::default(), clock.clone());
        cache.set(1, "stats");
        clock.advance(DEFAULT_TTL + Duration::from_millis(1));
        assert!(!cache.has(&1));
    }

    #[test]
    fn test_evicts_oldest_written() {
        let (mut cache, _) = cache(2);
        cache.set("a", 1);
        cache.set("b", 2);
        // Reading does not protect an entry from eviction.
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.set("c", 3);
        assert!(!cache.has(&"a"));
        assert!(cache.has(&"b"));
        assert!(cache.has(&"c"));

        // Rewriting a key makes it the newest.
        cache.set("b", 4);
        cache.set("d", 5);
        assert!(!cache.has(&"c"));
        assert_eq!(cache.get(&"b"), Some(&4));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity() {
        let (mut cache, _) = cache(0);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.has(&"b"));
    }
}
