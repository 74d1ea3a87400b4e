use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use orgauthz_core::{ActorId, AppResult};
use tracing::{debug, warn};

use crate::{ActorPermissionSet, PermissionCacheStore};

/// Default lifetime of a cached permission set.
pub const DEFAULT_PERMISSION_CACHE_TTL: Duration = Duration::from_secs(300);

/// Time-boxed memoization of actor permission sets keyed by actor id.
///
/// A cache outage degrades to direct loads; it never grants or denies on its own.
#[derive(Clone)]
pub struct PermissionCache {
    store: Arc<dyn PermissionCacheStore>,
    ttl: Duration,
}

impl PermissionCache {
    /// Creates a cache over a store. A zero ttl disables caching.
    #[must_use]
    pub fn new(store: Arc<dyn PermissionCacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Returns the configured ttl.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached set for an actor or loads and caches it.
    pub async fn get_or_load<F, Fut>(
        &self,
        actor_id: ActorId,
        loader: F,
    ) -> AppResult<ActorPermissionSet>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<ActorPermissionSet>>,
    {
        if self.ttl.is_zero() {
            return loader().await;
        }

        match self.store.get(actor_id).await {
            Ok(Some(permissions)) => {
                debug!(actor_id = %actor_id, "permission cache hit");
                return Ok(permissions);
            }
            Ok(None) => debug!(actor_id = %actor_id, "permission cache miss"),
            Err(error) => {
                warn!(actor_id = %actor_id, %error, "permission cache read failed; loading directly");
                return loader().await;
            }
        }

        let generation = match self.store.current_generation(actor_id).await {
            Ok(generation) => Some(generation),
            Err(error) => {
                warn!(actor_id = %actor_id, %error, "permission cache generation read failed");
                None
            }
        };

        let permissions = loader().await?;

        if let Some(generation) = generation {
            match self
                .store
                .put_if_current(actor_id, &permissions, generation, self.ttl)
                .await
            {
                Ok(true) => {}
                Ok(false) => debug!(
                    actor_id = %actor_id,
                    "actor invalidated during load; skipping cache write"
                ),
                Err(error) => {
                    warn!(actor_id = %actor_id, %error, "permission cache write failed");
                }
            }
        }

        Ok(permissions)
    }

    /// Drops the actor's entry. Failures propagate so mutation paths can
    /// report them instead of returning success over a stale cache.
    pub async fn invalidate(&self, actor_id: ActorId) -> AppResult<()> {
        self.store.invalidate(actor_id).await?;
        debug!(actor_id = %actor_id, "permission cache entry invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{DEFAULT_PERMISSION_CACHE_TTL, PermissionCache};
    use crate::ActorPermissionSet;
    use crate::test_support::{FailingPermissionCacheStore, FakePermissionCacheStore, actor};

    #[tokio::test]
    async fn store_outage_loads_directly() {
        let cache = PermissionCache::new(
            Arc::new(FailingPermissionCacheStore),
            DEFAULT_PERMISSION_CACHE_TTL,
        );
        let loads = AtomicUsize::new(0);

        let loaded = cache
            .get_or_load(actor(10), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(ActorPermissionSet::administrator())
            })
            .await;

        assert!(matches!(
            loaded,
            Ok(ActorPermissionSet {
                is_administrator: true,
                ..
            })
        ));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(cache.invalidate(actor(10)).await.is_err());
    }

    #[tokio::test]
    async fn invalidation_during_load_forces_the_next_read_to_reload() {
        let cache = PermissionCache::new(
            Arc::new(FakePermissionCacheStore::default()),
            DEFAULT_PERMISSION_CACHE_TTL,
        );
        let loads = AtomicUsize::new(0);

        let first = cache
            .get_or_load(actor(10), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                let invalidated = cache.invalidate(actor(10)).await;
                assert!(invalidated.is_ok());
                Ok(ActorPermissionSet::administrator())
            })
            .await;
        assert!(matches!(
            first,
            Ok(ActorPermissionSet {
                is_administrator: true,
                ..
            })
        ));

        let second = cache
            .get_or_load(actor(10), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(ActorPermissionSet::empty())
            })
            .await;
        assert!(matches!(
            second,
            Ok(ActorPermissionSet {
                is_administrator: false,
                ..
            })
        ));
        assert_eq!(loads.load(Ordering::SeqCst), 2);

        let cached = cache
            .get_or_load(actor(10), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(ActorPermissionSet::administrator())
            })
            .await;
        assert!(matches!(
            cached,
            Ok(ActorPermissionSet {
                is_administrator: false,
                ..
            })
        ));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }
}
