use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use chrono::{DateTime, TimeDelta, Utc};
use log::debug;

struct CacheEntry<T> {
    stored_at: DateTime<Utc>,
    value: T,
}

/// Time-to-live cache for fetched forecast documents.
///
/// Entries expire once they are older than the ttl, there is no size bound. The
/// current time is always given by the caller which keeps the cache deterministic
/// under test. The cache is safe to share between fetch threads.
pub struct ForecastCache<T> {
    ttl: TimeDelta,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

/// Returns the cache key for a coordinate, rounded to the 4 decimals the weather API accepts
///
/// # Arguments
///
/// * 'lat' - latitude
/// * 'long' - longitude
pub fn cache_key(lat: f64, long: f64) -> String {
    format!("{:.4},{:.4}", lat, long)
}

impl<T: Clone> ForecastCache<T> {
    /// Returns a new, empty, cache
    ///
    /// # Arguments
    ///
    /// * 'ttl' - how long an entry stays valid
    pub fn new(ttl: TimeDelta) -> ForecastCache<T> {
        ForecastCache { ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Returns a copy of a valid entry. An expired entry is evicted and None is returned.
    ///
    /// # Arguments
    ///
    /// * 'key' - the cache key
    /// * 'now' - current time
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let mut entries = self.lock();

        let expired = entries.get(key).map(|e| now - e.stored_at >= self.ttl)?;
        if expired {
            debug!("cache entry for {} expired", key);
            entries.remove(key);
            None
        } else {
            entries.get(key).map(|e| e.value.clone())
        }
    }

    /// Stores a value, replacing any existing entry for the key
    ///
    /// # Arguments
    ///
    /// * 'key' - the cache key
    /// * 'value' - value to store
    /// * 'now' - current time
    pub fn insert(&self, key: &str, value: T, now: DateTime<Utc>) {
        self.lock().insert(key.to_string(), CacheEntry { stored_at: now, value });
    }

    /// Evicts all expired entries and returns how many were evicted
    ///
    /// # Arguments
    ///
    /// * 'now' - current time
    pub fn purge(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now - e.stored_at < self.ttl);

        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
