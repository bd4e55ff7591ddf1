//! Credential store

use argon2::Params;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::model::{NewUser, User};
use crate::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
    /// argon2id parameters used for newly stored passwords
    params: Params,
}

impl UserStore {
    pub fn new(pool: SqlitePool, params: Params) -> Self {
        Self { pool, params }
    }

    /// Stores a new user with a hash of the given password
    pub async fn create(&self, user: &NewUser, password: &str) -> Result<User, StoreError> {
        let password = password.to_owned();
        let params = self.params.clone();
        let hash =
            tokio::task::spawn_blocking(move || hash_password(&password, &params)).await??;

        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, name, email, password, created_at) VALUES (?, ?, ?, ?, ?) RETURNING user_id, username, name, email",
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => Err(
                StoreError::Constraint(format!("User with username {}", user.username)),
            ),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, name, email FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("User {username}")))
    }

    pub async fn get_one(&self, user_id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>("SELECT user_id, username, name, email FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User with ID: {user_id}")))
    }

    /// Checks the password of a user
    ///
    /// An unknown username is reported the same way as a wrong password, `Ok(false)`. Errors are
    /// reserved for store failures and corrupt stored hashes.
    pub async fn validate(&self, password: &str, username: &str) -> Result<bool, StoreError> {
        let stored: Option<(String,)> =
            sqlx::query_as("SELECT password FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let Some((hash,)) = stored else {
            return Ok(false);
        };

        let password = password.to_owned();
        let valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;
        Ok(valid)
    }

    /// Administrative listing of users, not available
    pub async fn list(&self, _limit: i64) -> Result<Vec<User>, StoreError> {
        tracing::warn!("Attempted to list users");
        Err(StoreError::NotImplemented("Listing users"))
    }
}
