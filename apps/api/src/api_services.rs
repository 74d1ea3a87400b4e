mod database;
mod redis;
mod state_builder;

pub use database::connect_and_migrate;
pub use redis::build_redis_client;
pub use state_builder::build_app_state;
#[cfg(test)]
pub use state_builder::{AccessStores, assemble_app_state};
