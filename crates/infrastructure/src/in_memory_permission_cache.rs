use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use orgauthz_application::{ActorPermissionSet, CacheGeneration, PermissionCacheStore};
use orgauthz_core::{ActorId, AppResult};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct PermissionCacheSlot {
    generation: u64,
    permissions: ActorPermissionSet,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct PermissionCacheState {
    epoch: u64,
    slots: HashMap<ActorId, PermissionCacheSlot>,
}

impl PermissionCacheState {
    fn generation_of(&self, actor_id: ActorId) -> u64 {
        self.slots
            .get(&actor_id)
            .map_or(self.epoch, |slot| slot.generation)
    }
}

/// In-process permission cache with per-actor generations.
///
/// Only live entries hold a slot. Actors without a slot share the store-wide
/// epoch as their generation, and every invalidation advances that epoch, so
/// removing a slot can never let a load that started earlier write back.
/// Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct InMemoryPermissionCache {
    state: RwLock<PermissionCacheState>,
}

impl InMemoryPermissionCache {
    /// Creates an empty in-memory permission cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn slot_count(&self) -> usize {
        self.state.read().await.slots.len()
    }
}

#[async_trait]
impl PermissionCacheStore for InMemoryPermissionCache {
    async fn get(&self, actor_id: ActorId) -> AppResult<Option<ActorPermissionSet>> {
        {
            let state = self.state.read().await;
            match state.slots.get(&actor_id) {
                Some(slot) if slot.expires_at > Instant::now() => {
                    return Ok(Some(slot.permissions.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut state = self.state.write().await;
        if state
            .slots
            .get(&actor_id)
            .is_some_and(|slot| slot.expires_at <= Instant::now())
        {
            state.slots.remove(&actor_id);
        }

        Ok(None)
    }

    async fn current_generation(&self, actor_id: ActorId) -> AppResult<CacheGeneration> {
        Ok(CacheGeneration::new(
            self.state.read().await.generation_of(actor_id),
        ))
    }

    async fn put_if_current(
        &self,
        actor_id: ActorId,
        permissions: &ActorPermissionSet,
        generation: CacheGeneration,
        ttl: Duration,
    ) -> AppResult<bool> {
        if ttl.is_zero() {
            return Ok(false);
        }

        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now);

        let mut state = self.state.write().await;
        if state.generation_of(actor_id) != generation.value() {
            return Ok(false);
        }

        state.slots.insert(
            actor_id,
            PermissionCacheSlot {
                generation: generation.value(),
                permissions: permissions.clone(),
                expires_at,
            },
        );

        Ok(true)
    }

    async fn invalidate(&self, actor_id: ActorId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.epoch = state.epoch.wrapping_add(1);
        state.slots.remove(&actor_id);

        Ok(())
    }
}
