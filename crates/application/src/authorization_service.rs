use std::sync::Arc;
use std::time::Duration;

use orgauthz_core::{ActorId, AppResult};
use tracing::error;

use crate::hierarchy_walker::{DEFAULT_MAX_HIERARCHY_DEPTH, HierarchyWalker};
use crate::permission_cache::DEFAULT_PERMISSION_CACHE_TTL;
use crate::{
    AccessControlRepository, ActorPermissionSet, HierarchyRepository, PermissionCache,
    PermissionCacheStore, PermissionRepository, ScopeResolver,
};

mod data_access;
mod permissions;


/// Tunables of the authorization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationSettings {
    /// Lifetime of cached permission sets. Zero disables caching.
    pub cache_ttl: Duration,
    /// Bound on parent lookups per hierarchy walk.
    pub max_hierarchy_depth: usize,
}

impl Default for AuthorizationSettings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_PERMISSION_CACHE_TTL,
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
        }
    }
}

/// Public authorization facade: action checks, data-scope checks, and cache
/// invalidation hooks.
#[derive(Clone)]
pub struct AuthorizationService {
    permissions: PermissionRepository,
    cache: PermissionCache,
    resolver: ScopeResolver,
}

impl AuthorizationService {
    /// Creates a new authorization service from its stores.
    #[must_use]
    pub fn new(
        access_control: Arc<dyn AccessControlRepository>,
        hierarchy: Arc<dyn HierarchyRepository>,
        cache_store: Arc<dyn PermissionCacheStore>,
        settings: AuthorizationSettings,
    ) -> Self {
        Self {
            permissions: PermissionRepository::new(access_control),
            cache: PermissionCache::new(cache_store, settings.cache_ttl),
            resolver: ScopeResolver::new(
                hierarchy,
                HierarchyWalker::new(settings.max_hierarchy_depth),
            ),
        }
    }

    /// Drops the cached permission set of an actor.
    ///
    /// Collaborators mutating roles, permissions, or assignments call this for
    /// every affected actor before reporting success.
    pub async fn invalidate_cache(&self, actor_id: ActorId) -> AppResult<()> {
        self.cache.invalidate(actor_id).await
    }

    async fn load_permissions(&self, actor_id: ActorId) -> AppResult<ActorPermissionSet> {
        let permissions = self.permissions.clone();
        self.cache
            .get_or_load(actor_id, || async move {
                permissions.load_actor_permissions(actor_id).await
            })
            .await
            .inspect_err(|error| {
                error!(
                    actor_id = %actor_id,
                    %error,
                    "failed to load actor permissions; failing closed"
                );
            })
    }
}
