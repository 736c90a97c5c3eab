//! Memoization of async lookups on top of [`TtlCache`]

use super::TtlCache;
use std::future::Future;
use std::hash::Hash;
use tokio::time::Duration;

/// An async function whose results are cached per argument for a fixed TTL
pub struct Memoized<K, V, F> {
    cache: TtlCache<K, V>,
    factory: F,
}

impl<K, V, F, Fut, E> Memoized<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(&K) -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    /// Wrap `factory`, remembering each result for `ttl`
    pub fn new(ttl: Duration, factory: F) -> Self {
        Self {
            cache: TtlCache::new(ttl),
            factory,
        }
    }

    /// Return the cached result for `key`, computing it on a miss
    ///
    /// Errors are returned to the caller and not cached.
    pub async fn call(&self, key: &K) -> Result<V, E> {
        let factory = &self.factory;
        self.cache
            .get_or_create_async(key.clone(), || factory(key), None)
            .await
    }

    /// Forget every remembered result
    pub fn cache_clear(&self) {
        self.cache.clear();
    }

    /// The underlying cache
    pub fn cache(&self) -> &TtlCache<K, V> {
        &self.cache
    }
}
