use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the password hashing primitives
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Stored password hash is malformed")]
    MalformedHash,
}

/// Errors returned by the user and item stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Constraint(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors returned by the session token service
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token is malformed")]
    Malformed,
    #[error("Token has expired")]
    Expired,
    #[error("Token can be refreshed only in the last {window} seconds, {remaining} seconds left")]
    RefreshNotYetDue { remaining: i64, window: i64 },
    #[error("Failed to sign token: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("Token lifetime of {0} seconds is out of range")]
    LifetimeOutOfRange(i64),
}

/// Error at the HTTP boundary, rendered as a JSON body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = if status.is_server_error() {
            "error"
        } else {
            "fail"
        };
        let body = json!({
            "status": kind,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(what) => ApiError::Conflict(format!("{what} already exists")),
            StoreError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            err => {
                tracing::error!("Store error: {}", err);
                ApiError::Internal("Internal server error".to_owned())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::RefreshNotYetDue { .. } => ApiError::Validation(err.to_string()),
            TokenError::Encode(e) => {
                tracing::error!("Failed to create session token: {}", e);
                ApiError::Internal("Internal server error".to_owned())
            }
            TokenError::LifetimeOutOfRange(_) => {
                tracing::error!("Failed to create session token: {}", err);
                ApiError::Internal("Internal server error".to_owned())
            }
            TokenError::Expired => ApiError::Authentication("Token has expired".to_owned()),
            TokenError::InvalidSignature | TokenError::Malformed => {
                ApiError::Authentication("Token not valid".to_owned())
            }
        }
    }
}
