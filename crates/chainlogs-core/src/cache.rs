//! Capacity- and TTL-bounded key/value cache.
//!
//! Expiry is lazy: an entry is only checked (and dropped) when it is read.
//! There is no background sweeper, so memory is bounded by `capacity`.
//! When full, the oldest inserted entry is evicted (FIFO), regardless of how
//! recently it was read.
//!
//! Thread-safe via an internal `Mutex`; reads mutate on expiry.

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

/// Cache sizing. Defaults mirror the ABI cache of the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Time-to-live of an entry, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_capacity() -> usize {
    1_000
}

fn default_ttl_secs() -> u64 {
    24 * 3_600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded FIFO cache with per-entry TTL.
pub struct BoundedCache<K, V> {
    capacity: usize,
    ttl: Duration,
    entries: Mutex<IndexMap<K, Entry<V>>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        Ok(Self {
            capacity,
            ttl,
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
        })
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.capacity, config.ttl())
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value if present and not expired. Expired entries are removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            None => return None,
            Some(e) => e.inserted_at.elapsed() > self.ttl,
        };
        if expired {
            entries.shift_remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    /// Insert or replace. A replaced key moves to the back of the eviction
    /// order and starts a fresh TTL window.
    pub fn set(&self, key: K, value: V) {
        let mut entries = self.lock();
        entries.shift_remove(&key);
        while entries.len() >= self.capacity {
            if entries.shift_remove_index(0).is_none() {
                break;
            }
        }
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().shift_remove(key).map(|e| e.value)
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
