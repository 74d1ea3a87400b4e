//! Infrastructure adapters for the authorization ports.

#![forbid(unsafe_code)]

mod in_memory_access_control_store;
mod in_memory_permission_cache;
mod postgres_access_control_store;
mod redis_permission_cache;

pub use in_memory_access_control_store::InMemoryAccessControlStore;
pub use in_memory_permission_cache::InMemoryPermissionCache;
pub use postgres_access_control_store::PostgresAccessControlStore;
pub use redis_permission_cache::RedisPermissionCache;
