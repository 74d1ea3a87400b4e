use std::sync::Arc;

use orgauthz_application::{
    AccessControlRepository, AuthorizationService, AuthorizationSettings, HierarchyRepository,
    PermissionCacheStore, RoleAdminRepository, RoleAdminService,
};
use orgauthz_core::AppResult;
use orgauthz_infrastructure::{
    InMemoryAccessControlStore, InMemoryPermissionCache, PostgresAccessControlStore,
    RedisPermissionCache,
};
use tracing::info;

use crate::api_config::{AccessStoreConfig, ApiConfig, PermissionCacheConfig};
use crate::dev_seed;
use crate::state::AppState;

use super::{build_redis_client, connect_and_migrate};

const PERMISSION_CACHE_KEY_PREFIX: &str = "orgauthz:permissions";

/// Ports served by one access-control store.
pub struct AccessStores {
    pub access_control: Arc<dyn AccessControlRepository>,
    pub hierarchy: Arc<dyn HierarchyRepository>,
    pub role_admin: Arc<dyn RoleAdminRepository>,
}

impl AccessStores {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AccessControlRepository + HierarchyRepository + RoleAdminRepository + 'static,
    {
        Self {
            access_control: store.clone(),
            hierarchy: store.clone(),
            role_admin: store,
        }
    }
}

pub async fn build_app_state(config: &ApiConfig) -> AppResult<AppState> {
    let stores = build_access_stores(&config.access_store).await?;
    let cache_store = build_permission_cache_store(&config.permission_cache)?;

    Ok(assemble_app_state(
        stores,
        cache_store,
        config.authorization,
        config.actor_id_header.clone(),
    ))
}

pub fn assemble_app_state(
    stores: AccessStores,
    cache_store: Arc<dyn PermissionCacheStore>,
    settings: AuthorizationSettings,
    actor_id_header: String,
) -> AppState {
    let authorization_service =
        AuthorizationService::new(stores.access_control, stores.hierarchy, cache_store, settings);

    AppState {
        role_admin_service: RoleAdminService::new(
            authorization_service.clone(),
            stores.role_admin,
        ),
        authorization_service,
        actor_id_header,
    }
}

async fn build_access_stores(config: &AccessStoreConfig) -> AppResult<AccessStores> {
    match config {
        AccessStoreConfig::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            Ok(AccessStores::from_store(Arc::new(
                PostgresAccessControlStore::new(pool),
            )))
        }
        AccessStoreConfig::InMemory => {
            let store = Arc::new(InMemoryAccessControlStore::new());
            dev_seed::seed_demo_organization(&store).await?;
            info!("using in-memory access store seeded with the demo organization");
            Ok(AccessStores::from_store(store))
        }
    }
}

fn build_permission_cache_store(
    config: &PermissionCacheConfig,
) -> AppResult<Arc<dyn PermissionCacheStore>> {
    match config {
        PermissionCacheConfig::InMemory => Ok(Arc::new(InMemoryPermissionCache::new())),
        PermissionCacheConfig::Redis { redis_url } => Ok(Arc::new(RedisPermissionCache::new(
            build_redis_client(redis_url)?,
            PERMISSION_CACHE_KEY_PREFIX,
        ))),
    }
}
