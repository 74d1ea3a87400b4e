use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use orgauthz_application::{
    AuthorizationSettings, DEFAULT_MAX_HIERARCHY_DEPTH, DEFAULT_PERMISSION_CACHE_TTL,
};
use orgauthz_core::AppError;
use tracing_subscriber::EnvFilter;

/// Backing store for roles, grants, and the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessStoreConfig {
    Postgres { database_url: String },
    InMemory,
}

/// Backing store for cached permission sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCacheConfig {
    InMemory,
    Redis { redis_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub access_store: AccessStoreConfig,
    pub permission_cache: PermissionCacheConfig,
    pub authorization: AuthorizationSettings,
    pub actor_id_header: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        let config = Self::from_lookup(|name| env::var(name).ok())?;

        Ok(Self {
            migrate_only,
            ..config
        })
    }

    /// Builds the configuration from a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = optional("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3002);

        let access_store = match optional("ACCESS_STORE")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => AccessStoreConfig::Postgres {
                database_url: required("DATABASE_URL")?,
            },
            "memory" => AccessStoreConfig::InMemory,
            other => {
                return Err(AppError::Validation(format!(
                    "ACCESS_STORE must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let permission_cache = match optional("PERMISSION_CACHE")
            .unwrap_or_else(|| "memory".to_owned())
            .as_str()
        {
            "memory" => PermissionCacheConfig::InMemory,
            "redis" => PermissionCacheConfig::Redis {
                redis_url: required("REDIS_URL").map_err(|_| {
                    AppError::Validation(
                        "REDIS_URL is required when PERMISSION_CACHE=redis".to_owned(),
                    )
                })?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "PERMISSION_CACHE must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        let cache_ttl = optional("PERMISSION_CACHE_TTL_SECONDS")
            .map(|value| {
                value.parse::<u64>().map(Duration::from_secs).map_err(|error| {
                    AppError::Validation(format!("invalid PERMISSION_CACHE_TTL_SECONDS: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_PERMISSION_CACHE_TTL);

        let max_hierarchy_depth = optional("HIERARCHY_MAX_DEPTH")
            .map(|value| {
                value.parse::<usize>().map_err(|error| {
                    AppError::Validation(format!("invalid HIERARCHY_MAX_DEPTH: {error}"))
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_HIERARCHY_DEPTH);
        if max_hierarchy_depth == 0 {
            return Err(AppError::Validation(
                "HIERARCHY_MAX_DEPTH must be at least 1".to_owned(),
            ));
        }

        let actor_id_header = optional("ACTOR_ID_HEADER")
            .unwrap_or_else(|| "x-actor-id".to_owned())
            .to_ascii_lowercase();

        Ok(Self {
            migrate_only: false,
            api_host,
            api_port,
            access_store,
            permission_cache,
            authorization: AuthorizationSettings {
                cache_ttl,
                max_hierarchy_depth,
            },
            actor_id_header,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Configuration(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use orgauthz_core::AppError;

    use super::{AccessStoreConfig, ApiConfig, PermissionCacheConfig};

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(|name| variables.get(name).cloned())
    }

    #[test]
    fn defaults_need_only_a_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/orgauthz")])
            .unwrap_or_else(|error| panic!("config failed: {error}"));

        assert_eq!(config.api_port, 3002);
        assert_eq!(config.actor_id_header, "x-actor-id");
        assert_eq!(config.permission_cache, PermissionCacheConfig::InMemory);
        assert_eq!(config.authorization.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.authorization.max_hierarchy_depth, 64);
        assert!(matches!(
            config.access_store,
            AccessStoreConfig::Postgres { ref database_url } if database_url.ends_with("/orgauthz")
        ));
        assert!(config.socket_address().is_ok());
    }

    #[test]
    fn postgres_store_requires_database_url() {
        assert!(matches!(load(&[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn redis_cache_requires_redis_url() {
        let config = load(&[("ACCESS_STORE", "memory"), ("PERMISSION_CACHE", "redis")]);
        assert!(matches!(config, Err(AppError::Validation(_))));

        let config = load(&[
            ("ACCESS_STORE", "memory"),
            ("PERMISSION_CACHE", "redis"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
        ]);
        assert!(matches!(
            config.map(|config| config.permission_cache),
            Ok(PermissionCacheConfig::Redis { .. })
        ));
    }

    #[test]
    fn rejects_unknown_backends_and_zero_depth() {
        let store = load(&[("ACCESS_STORE", "sqlite")]);
        assert!(matches!(store, Err(AppError::Validation(_))));

        let depth = load(&[("ACCESS_STORE", "memory"), ("HIERARCHY_MAX_DEPTH", "0")]);
        assert!(matches!(depth, Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_ttl_is_accepted_and_header_is_normalized() {
        let config = load(&[
            ("ACCESS_STORE", "memory"),
            ("PERMISSION_CACHE_TTL_SECONDS", "0"),
            ("ACTOR_ID_HEADER", "X-Employee-Id"),
        ])
        .unwrap_or_else(|error| panic!("config failed: {error}"));

        assert!(config.authorization.cache_ttl.is_zero());
        assert_eq!(config.actor_id_header, "x-employee-id");
    }
}
