//! Connection pool construction, mirroring the defaults and logging shape
//! used throughout this codebase for provisioning a `PgPool`.

use std::time::Duration;

use litscan_core::{defaults, Error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::Pool;
use sqlx::Postgres;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::DEFAULT_MAX_CONNECTIONS,
            min_connections: 0,
            connect_timeout: Duration::from_secs(defaults::DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(defaults::DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }
}

pub async fn create_pool(database_url: &str) -> Result<Pool<Postgres>> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<Pool<Postgres>> {
    tracing::info!(subsystem = "database", component = "pool", op = "create", "creating connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(database_url)
        .await
        .map_err(Error::from)?;

    tracing::info!(
        subsystem = "database",
        component = "pool",
        op = "established",
        max_connections = config.max_connections,
        "connection pool established"
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_named_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, defaults::DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.connect_timeout, Duration::from_secs(defaults::DEFAULT_CONNECT_TIMEOUT_SECS));
    }

    #[test]
    fn with_max_connections_overrides_the_default() {
        let config = PoolConfig::default().with_max_connections(25);
        assert_eq!(config.max_connections, 25);
    }
}
