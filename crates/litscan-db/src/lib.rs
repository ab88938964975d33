//! # litscan-db
//!
//! PostgreSQL implementation of the `Store` contract: jobs, consumers,
//! articles, results, sentences, and metadata links.

pub mod pool;
pub mod postgres;
pub mod store;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_fixtures;

pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use postgres::PgStore;
pub use store::{NewAbstractSentence, NewArticle, NewBodySentence, Store};

use litscan_core::Result;
use sqlx::{Pool, Postgres};

/// Connects to Postgres and returns a ready-to-use store.
pub async fn connect(database_url: &str) -> Result<PgStore> {
    let pool = create_pool(database_url).await?;
    Ok(PgStore::new(pool))
}

pub async fn connect_with_pool(pool: Pool<Postgres>) -> PgStore {
    PgStore::new(pool)
}
