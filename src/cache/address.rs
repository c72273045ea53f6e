// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Generic address-keyed cache
//!
//! Stores the latest known value per contract address. Keys are normalized to
//! lower case so letter-case variants of one address share an entry. There is
//! no TTL and no eviction: entries live until they are overwritten by a
//! refresh or removed by [`AddressCache::clear`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Normalized cache key: trimmed, lower-case address string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Normalize an address string into a key
    ///
    /// Well-formed addresses are rendered as `0x`-prefixed lower-case hex;
    /// anything else is trimmed and lower-cased as-is.
    pub fn new(address: &str) -> Self {
        let trimmed = address.trim();
        match trimmed.parse::<Address>() {
            Ok(parsed) => Self::from(parsed),
            Err(_) => Self(trimmed.to_lowercase()),
        }
    }

    /// The normalized address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<Address> for CacheKey {
    fn from(address: Address) -> Self {
        Self(format!("{address:#x}"))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of lookups that found an entry
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Current number of entries in the cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Thread-safe cache of the latest value per address
///
/// Concurrent writes for the same key are last-write-wins. Every write for
/// one circle comes from the same contract, so competing writers carry
/// equivalent data.
///
/// # Examples
///
/// ```rust
/// use circlescan::AddressCache;
///
/// let cache: AddressCache<u64> = AddressCache::new("rounds");
/// cache.set("0xAbC0000000000000000000000000000000000001", 7);
///
/// assert_eq!(cache.get("0xabc0000000000000000000000000000000000001"), Some(7));
///
/// cache.clear(None);
/// assert!(cache.is_empty());
/// ```
#[derive(Debug)]
pub struct AddressCache<V> {
    name: &'static str,
    entries: RwLock<HashMap<CacheKey, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> AddressCache<V> {
    /// Creates an empty cache; `name` only shows up in logs
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached value for `address`, in any letter case
    pub fn get(&self, address: impl Into<CacheKey>) -> Option<V> {
        let key = address.into();
        let value = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&key).cloned());

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, key = %key, "Cache miss");
        }
        value
    }

    /// Stores `value` for `address`, replacing any previous entry
    pub fn set(&self, address: impl Into<CacheKey>, value: V) {
        let key = address.into();
        if let Ok(mut entries) = self.entries.write() {
            debug!(cache = self.name, key = %key, "Cache write");
            entries.insert(key, value);
        }
    }

    /// Removes one entry, or every entry when `address` is `None`
    pub fn clear(&self, address: Option<&str>) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        match address {
            Some(address) => {
                let key = CacheKey::new(address);
                if entries.remove(&key).is_some() {
                    debug!(cache = self.name, key = %key, "Cleared cache entry");
                }
            }
            None => {
                debug!(cache = self.name, entries = entries.len(), "Cleared cache");
                entries.clear();
            }
        }
    }

    /// Check if an entry exists without touching hit statistics
    pub fn contains(&self, address: impl Into<CacheKey>) -> bool {
        let key = address.into();
        self.entries
            .read()
            .is_ok_and(|entries| entries.contains_key(&key))
    }

    /// Number of cached addresses
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns current cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
