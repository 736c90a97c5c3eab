//! The slot holding the single shared backend client

use super::TtlCache;
use crate::client::{BackendClient, BackendResult, ClientFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

/// Cache key under which the shared client is stored
pub const CLIENT_SLOT_KEY: &str = "backend_client";

/// How long a constructed client is reused before being rebuilt
pub const DEFAULT_CLIENT_TTL: Duration = Duration::from_secs(30 * 60);

/// Holds at most one live backend client
///
/// The first caller after a miss constructs the client through the factory;
/// concurrent callers wait and then share that same handle. A failed
/// construction is returned to every waiting caller in turn and never cached.
pub struct ClientSlot {
    cache: TtlCache<&'static str, Arc<dyn BackendClient>>,
    factory: Arc<dyn ClientFactory>,
    constructions: AtomicUsize,
}

impl ClientSlot {
    /// Create a slot with [`DEFAULT_CLIENT_TTL`]
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self::with_ttl(factory, DEFAULT_CLIENT_TTL)
    }

    /// Create a slot whose client is rebuilt after `ttl`
    pub fn with_ttl(factory: Arc<dyn ClientFactory>, ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
            factory,
            constructions: AtomicUsize::new(0),
        }
    }

    /// Return the live client, constructing one on a miss
    pub async fn get_or_create_client(&self) -> BackendResult<Arc<dyn BackendClient>> {
        self.cache
            .get_or_create_async(
                CLIENT_SLOT_KEY,
                || async move {
                    self.constructions.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!("Backend client cache miss, constructing");
                    self.factory.construct().inspect_err(|e| {
                        tracing::warn!("Backend client construction failed: {}", e);
                    })
                },
                None,
            )
            .await
    }

    /// Drop the cached client so the next access constructs a new one
    pub fn invalidate(&self) {
        if self.cache.invalidate(CLIENT_SLOT_KEY) {
            tracing::info!("Backend client invalidated");
        }
    }

    /// Whether a live client is currently cached
    pub fn is_populated(&self) -> bool {
        self.cache.get(CLIENT_SLOT_KEY).is_some()
    }

    /// Number of construction attempts made through this slot
    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    /// How long a constructed client is reused
    pub fn ttl(&self) -> Duration {
        self.cache.default_ttl()
    }
}

impl std::fmt::Debug for ClientSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSlot")
            .field("ttl", &self.cache.default_ttl())
            .field("constructions", &self.construction_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockBackendClient, MockClientFactory};
    use crate::error::BackendError;

    fn slot_with(factory: &MockClientFactory, ttl: Duration) -> ClientSlot {
        ClientSlot::with_ttl(Arc::new(factory.clone()), ttl)
    }

    #[tokio::test]
    async fn test_constructs_once_per_ttl_window() {
        let factory = MockClientFactory::new(MockBackendClient::new());
        let slot = slot_with(&factory, Duration::from_secs(60));

        let first = slot.get_or_create_client().await.unwrap();
        let second = slot.get_or_create_client().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.constructions(), 1);
        assert_eq!(slot.construction_count(), 1);
        assert!(slot.is_populated());
    }

    #[tokio::test]
    async fn test_reconstructs_after_expiry() {
        let factory = MockClientFactory::default();
        let slot = slot_with(&factory, Duration::from_millis(10));

        slot.get_or_create_client().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        slot.get_or_create_client().await.unwrap();

        assert_eq!(factory.constructions(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reconstruction() {
        let factory = MockClientFactory::default();
        let slot = slot_with(&factory, Duration::from_secs(60));

        slot.get_or_create_client().await.unwrap();
        slot.invalidate();
        assert!(!slot.is_populated());
        slot.get_or_create_client().await.unwrap();

        assert_eq!(factory.constructions(), 2);
    }

    #[tokio::test]
    async fn test_construction_failure_propagates_and_is_not_cached() {
        let factory = MockClientFactory::default();
        factory.fail_with(Some(BackendError::ConfigMissing(vec![
            "JIRA_API_TOKEN".to_string(),
        ])));
        let slot = slot_with(&factory, Duration::from_secs(60));

        let err = slot.get_or_create_client().await.err().unwrap();
        assert_eq!(
            err,
            BackendError::ConfigMissing(vec!["JIRA_API_TOKEN".to_string()])
        );
        assert!(!slot.is_populated());

        factory.fail_with(None);
        assert!(slot.get_or_create_client().await.is_ok());
        assert_eq!(factory.constructions(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access_constructs_once() {
        let factory = MockClientFactory::default();
        let slot = Arc::new(slot_with(&factory, Duration::from_secs(60)));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let slot = Arc::clone(&slot);
                tokio::spawn(async move { slot.get_or_create_client().await.is_ok() })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(factory.constructions(), 1);
    }

    #[test]
    fn test_default_ttl_is_thirty_minutes() {
        let slot = ClientSlot::new(Arc::new(MockClientFactory::default()));
        assert_eq!(slot.ttl(), Duration::from_secs(1800));
    }
}
