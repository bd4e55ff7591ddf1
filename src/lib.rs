//! Multi-user to-do list backend with stateless session tokens

pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod password;
pub mod route;
pub mod schema;
pub mod store;
pub mod token;

use sqlx::SqlitePool;

use crate::config::{AuthConfig, Config};
use crate::error::StoreError;
use crate::store::{ItemStore, UserStore};
use crate::token::TokenService;

// Struct representing the application state
pub struct AppState {
    pub users: UserStore,
    pub items: ItemStore,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: SqlitePool, auth: &AuthConfig) -> Self {
        Self {
            users: UserStore::new(pool.clone(), auth.password_params.clone()),
            items: ItemStore::new(pool),
            tokens: TokenService::from_config(auth),
        }
    }

    /// Connects to the configured database and builds the state around it
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let pool = store::connect(&config.db).await?;
        Ok(Self::new(pool, &config.auth))
    }
}
