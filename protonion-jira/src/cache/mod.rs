//! Time-bounded caching
//!
//! [`TtlCache`] is a generic expiring key-value store. [`Memoized`] wraps a
//! factory with a cache, and [`ClientSlot`] specializes the cache to hold the
//! single shared backend client.

mod memo;
mod slot;

pub use memo::Memoized;
pub use slot::{ClientSlot, CLIENT_SLOT_KEY, DEFAULT_CLIENT_TTL};

use std::borrow::Borrow;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::time::{Duration, Instant};

/// A cached value and the instant at which it stops being served
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,
    /// First instant at which the entry is no longer served
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Expiring key-value store
///
/// Entries are evicted by time only; there is no size bound. Reads never
/// return an entry whose `expires_at` has passed: such entries are removed
/// and reported as absent.
///
/// `get_or_create` holds a creation gate across the factory, and
/// `get_or_create_async` holds an async gate across the factory's `await`,
/// so concurrent callers never construct the same value twice. The map lock
/// itself is never held while a factory runs, so a factory may read or write
/// other keys of the same cache.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    sync_gate: Mutex<()>,
    creation_gate: tokio::sync::Mutex<()>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache whose entries live for `default_ttl`
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sync_gate: Mutex::new(()),
            creation_gate: tokio::sync::Mutex::new(()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// TTL applied when `set` or a factory call does not override it
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup<Q>(&self, entries: &mut HashMap<K, CacheEntry<V>>, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn store(&self, entries: &mut HashMap<K, CacheEntry<V>>, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);
        entries.insert(key, CacheEntry { value, expires_at });
    }

    // Recheck after a gate wait; another caller may have filled the entry
    fn live_value(&self, key: &K) -> Option<V> {
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Return the live value for `key`, removing it if it has expired
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.lock();
        self.lookup(&mut entries, key)
    }

    /// Insert or overwrite `key`; `ttl` overrides the default TTL
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        let mut entries = self.lock();
        self.store(&mut entries, key, value, ttl);
    }

    /// Return the live value for `key`, or run `factory` once and cache its result
    ///
    /// Factory errors propagate unchanged and nothing is stored. The factory
    /// may use the cache, but must not call `get_or_create` itself.
    pub fn get_or_create<F, E>(&self, key: K, factory: F, ttl: Option<Duration>) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let _gate = self
            .sync_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(value) = self.live_value(&key) {
            return Ok(value);
        }

        let value = factory()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Async counterpart of [`TtlCache::get_or_create`] for factories that perform I/O
    pub async fn get_or_create_async<F, Fut, E>(
        &self,
        key: K,
        factory: F,
        ttl: Option<Duration>,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let _gate = self.creation_gate.lock().await;
        if let Some(value) = self.live_value(&key) {
            return Ok(value);
        }

        let value = factory().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Remove `key`, returning whether an entry (live or expired) was present
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Eagerly drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no entries are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit and miss counters since creation or the last reset
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            size: self.len(),
        }
    }

    /// Zero the hit and miss counters
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("default_ttl", &self.default_ttl)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before any read
    pub hit_rate: f64,
    /// Stored entries, including expired ones not yet purged
    pub size: usize,
}
