//! Session tokens
//!
//! A session token is a HS256 JWT carrying the username, the user id and the expiration time.
//! Tokens are stateless: nothing is stored server side, so a token lives until it expires.
//! Refreshing is only possible close to the expiration, which keeps a stolen token from being
//! extended indefinitely while still allowing silent renewal by an active client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::TokenError;
use crate::model::User;

/// Claims encoded in the session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Expiration as a unix timestamp
    pub exp: i64,
}

/// Where a token is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Valid,
    RefreshEligible,
    Expired,
}

impl Claims {
    /// Seconds left until expiration, negative once expired
    pub fn remaining_ttl(&self) -> i64 {
        self.exp.saturating_sub(Utc::now().timestamp())
    }

    pub fn state(&self, refresh_window: i64) -> TokenState {
        match self.remaining_ttl() {
            ttl if ttl <= 0 => TokenState::Expired,
            ttl if ttl <= refresh_window => TokenState::RefreshEligible,
            _ => TokenState::Valid,
        }
    }
}

/// Freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: i64,
    refresh_window: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, refresh_window: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
            refresh_window: i64::try_from(refresh_window.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl,
            config.refresh_window,
        )
    }

    /// Token lifetime in seconds
    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    /// Issues a new session token for the user
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_for(user.username.clone(), user.user_id)
    }

    fn issue_for(&self, username: String, user_id: i64) -> Result<IssuedToken, TokenError> {
        let expires_at = chrono::Duration::try_seconds(self.ttl)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or(TokenError::LifetimeOutOfRange(self.ttl))?;
        let claims = Claims {
            username,
            user_id,
            exp: expires_at.timestamp(),
        };
        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, expires_at })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encode)
    }

    /// Verifies the token signature and expiration, returning its claims
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        // The decoder accepts a token expiring this very second
        if data.claims.state(self.refresh_window) == TokenState::Expired {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Re-issues a token that is about to expire, keeping its claims
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, TokenError> {
        let claims = self.parse(token)?;

        let remaining = claims.remaining_ttl();
        if remaining > self.refresh_window {
            return Err(TokenError::RefreshNotYetDue {
                remaining,
                window: self.refresh_window,
            });
        }

        self.issue_for(claims.username, claims.user_id)
    }
}
