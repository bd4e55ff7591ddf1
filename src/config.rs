//! Service configuration, read from the environment (and `.env` if present)

use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use argon2::Params;
use thiserror::Error;

/// Longest accepted token lifetime or refresh window (30 days)
const MAX_TOKEN_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for waiting on a pooled connection
    pub acquire_timeout: Duration,
}

/// Session token and password hashing settings
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Remaining lifetime at or below which a token may be refreshed
    pub refresh_window: Duration,
    /// argon2id cost parameters for newly hashed passwords
    pub password_params: Params,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("refresh_window", &self.refresh_window)
            .field("password_params", &self.password_params)
            .finish()
    }
}

/// Top level service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub request_timeout: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads `.env` (if any) and reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let memory_kib = parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", Params::DEFAULT_M_COST)?;
        let iterations = parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", Params::DEFAULT_T_COST)?;
        let password_params = Params::new(memory_kib, iterations, 1, None).map_err(|e| match e {
            argon2::Error::MemoryTooLittle | argon2::Error::MemoryTooMuch => ConfigError::Invalid {
                key: "PASSWORD_HASH_MEMORY_KIB",
                value: memory_kib.to_string(),
            },
            _ => ConfigError::Invalid {
                key: "PASSWORD_HASH_ITERATIONS",
                value: iterations.to_string(),
            },
        })?;

        Ok(Self {
            listen: parse_or(&lookup, "LISTEN_ADDR", SocketAddr::from(([127, 0, 0, 1], 12345)))?,
            db: DbConfig {
                url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://todo.db".to_owned()),
                max_connections: parse_in(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    10,
                    1..=u32::MAX,
                )?,
                acquire_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    5,
                )?),
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl: Duration::from_secs(parse_in(
                    &lookup,
                    "TOKEN_TTL_SECS",
                    300,
                    1..=MAX_TOKEN_SECS,
                )?),
                refresh_window: Duration::from_secs(parse_in(
                    &lookup,
                    "TOKEN_REFRESH_WINDOW_SECS",
                    30,
                    0..=MAX_TOKEN_SECS,
                )?),
                password_params,
            },
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?),
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_owned()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_in<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + ToString,
{
    let value = parse_or(lookup, key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_applied() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "secret")])).unwrap();

        assert_eq!(config.listen, SocketAddr::from(([127, 0, 0, 1], 12345)));
        assert_eq!(config.db.url, "sqlite://todo.db");
        assert_eq!(config.db.max_connections, 10);
        assert_eq!(config.auth.token_ttl, Duration::from_secs(300));
        assert_eq!(config.auth.refresh_window, Duration::from_secs(30));
        assert_eq!(config.auth.password_params.m_cost(), 19 * 1024);
        assert_eq!(config.auth.password_params.t_cost(), 2);
        assert_eq!(config.auth.password_params.p_cost(), 1);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn overrides_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("LISTEN_ADDR", "0.0.0.0:8080"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("TOKEN_TTL_SECS", "60"),
            ("PASSWORD_HASH_ITERATIONS", "3"),
            ("PASSWORD_HASH_MEMORY_KIB", "1024"),
        ]))
        .unwrap();

        assert_eq!(config.listen, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.db.url, "sqlite::memory:");
        assert_eq!(config.auth.token_ttl, Duration::from_secs(60));
        assert_eq!(config.auth.password_params.t_cost(), 3);
        assert_eq!(config.auth.password_params.m_cost(), 1024);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("TOKEN_TTL_SECS", "five minutes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TOKEN_TTL_SECS", .. }));

        let err = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("PASSWORD_HASH_ITERATIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "PASSWORD_HASH_ITERATIONS",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_values_rejected() {
        for (key, value) in [
            ("DATABASE_MAX_CONNECTIONS", "0"),
            ("TOKEN_TTL_SECS", "0"),
            ("TOKEN_TTL_SECS", "2592001"),
            ("TOKEN_TTL_SECS", "18446744073709551615"),
            ("TOKEN_REFRESH_WINDOW_SECS", "2592001"),
        ] {
            let err = Config::from_lookup(lookup(&[("JWT_SECRET", "secret"), (key, value)]))
                .unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { key: k, .. } if *k == key),
                "{key}={value}: {err}"
            );
        }

        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("TOKEN_TTL_SECS", "2592000"),
            ("DATABASE_MAX_CONNECTIONS", "1"),
        ]))
        .unwrap();
        assert_eq!(config.auth.token_ttl, Duration::from_secs(2_592_000));
        assert_eq!(config.db.max_connections, 1);
    }

    #[test]
    fn password_memory_below_minimum_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("PASSWORD_HASH_MEMORY_KIB", "1"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "PASSWORD_HASH_MEMORY_KIB",
                ..
            }
        ));
    }

    #[test]
    fn secret_not_in_debug_output() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "hunter2")])).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
