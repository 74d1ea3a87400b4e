//! Redis-backed permission cache shared across service instances.

use std::time::Duration;

use async_trait::async_trait;
use orgauthz_application::{ActorPermissionSet, CacheGeneration, PermissionCacheStore};
use orgauthz_core::{ActorId, AppError, AppResult};
use redis::{AsyncCommands, Script};

const PUT_IF_CURRENT_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[2])
if current == false then
  current = '0'
end
if current == ARGV[1] then
  redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
  return 1
end
return 0
"#;

/// Redis implementation of the permission cache store.
///
/// Entries are JSON values written with `SET EX`. Each actor also owns a
/// generation counter that invalidation increments, and writes go through a
/// compare-and-set script keyed on it.
#[derive(Clone)]
pub struct RedisPermissionCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisPermissionCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn entry_key(&self, actor_id: ActorId) -> String {
        format!("{}:actor:{actor_id}", self.key_prefix)
    }

    fn generation_key(&self, actor_id: ActorId) -> String {
        format!("{}:actor:{actor_id}:generation", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl PermissionCacheStore for RedisPermissionCache {
    async fn get(&self, actor_id: ActorId) -> AppResult<Option<ActorPermissionSet>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> = connection
            .get(self.entry_key(actor_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read permission cache entry: {error}"))
            })?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str::<ActorPermissionSet>(value).map_err(|error| {
                    AppError::Internal(format!(
                        "invalid permission cache entry for actor '{actor_id}': {error}"
                    ))
                })
            })
            .transpose()
    }

    async fn current_generation(&self, actor_id: ActorId) -> AppResult<CacheGeneration> {
        let mut connection = self.connection().await?;
        let generation: Option<u64> = connection
            .get(self.generation_key(actor_id))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read permission cache generation: {error}"))
            })?;

        Ok(CacheGeneration::new(generation.unwrap_or_default()))
    }

    async fn put_if_current(
        &self,
        actor_id: ActorId,
        permissions: &ActorPermissionSet,
        generation: CacheGeneration,
        ttl: Duration,
    ) -> AppResult<bool> {
        let ttl_seconds = ttl.as_secs();
        if ttl_seconds == 0 {
            return Ok(false);
        }

        let value = serde_json::to_string(permissions).map_err(|error| {
            AppError::Internal(format!("failed to encode permission cache entry: {error}"))
        })?;
        let mut connection = self.connection().await?;

        let stored: i32 = Script::new(PUT_IF_CURRENT_SCRIPT)
            .key(self.entry_key(actor_id))
            .key(self.generation_key(actor_id))
            .arg(generation.value())
            .arg(value)
            .arg(ttl_seconds)
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write permission cache entry: {error}"))
            })?;

        Ok(stored == 1)
    }

    async fn invalidate(&self, actor_id: ActorId) -> AppResult<()> {
        let mut connection = self.connection().await?;

        redis::pipe()
            .atomic()
            .incr(self.generation_key(actor_id), 1_u64)
            .ignore()
            .del(self.entry_key(actor_id))
            .ignore()
            .query_async::<()>(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to invalidate permission cache entry: {error}"))
            })
    }
}
