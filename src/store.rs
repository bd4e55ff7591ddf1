//! Relational storage of users and their to-do items

pub mod items;
pub mod users;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DbConfig;
use crate::error::StoreError;

pub use items::ItemStore;
pub use users::UserStore;

/// Opens the connection pool, creating the database file if needed, and applies migrations
pub async fn connect(config: &DbConfig) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout);

    // Every connection to an in-memory database opens a separate, empty one
    if config.url.contains(":memory:") {
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!(url = %config.url, "Database ready");
    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let config = DbConfig {
        url: "sqlite::memory:".to_owned(),
        max_connections: 1,
        acquire_timeout: std::time::Duration::from_secs(5),
    };
    connect(&config).await.unwrap()
}
