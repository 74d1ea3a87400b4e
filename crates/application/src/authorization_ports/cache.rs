use std::time::Duration;

use async_trait::async_trait;
use orgauthz_core::{ActorId, AppResult};

use crate::ActorPermissionSet;

/// Per-actor version marker captured before a cache-miss load.
///
/// Every invalidation advances the actor's generation, so a value loaded under
/// an older generation is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheGeneration(u64);

impl CacheGeneration {
    /// Wraps a raw generation counter.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw generation counter.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Storage port for cached actor permission sets.
#[async_trait]
pub trait PermissionCacheStore: Send + Sync {
    /// Returns a live entry for the actor, if any.
    async fn get(&self, actor_id: ActorId) -> AppResult<Option<ActorPermissionSet>>;

    /// Returns the actor's current generation.
    async fn current_generation(&self, actor_id: ActorId) -> AppResult<CacheGeneration>;

    /// Stores an entry with ttl unless the actor was invalidated since
    /// `generation` was read. Returns whether the entry was stored.
    async fn put_if_current(
        &self,
        actor_id: ActorId,
        permissions: &ActorPermissionSet,
        generation: CacheGeneration,
        ttl: Duration,
    ) -> AppResult<bool>;

    /// Drops the actor's entry and advances its generation.
    async fn invalidate(&self, actor_id: ActorId) -> AppResult<()>;
}
