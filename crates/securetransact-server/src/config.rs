use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Secrets that are only acceptable outside production.
const PLACEHOLDER_SECRETS: &[&str] = &["your-secret-key", "dev-secret-change-me", "change-me"];

/// One year.
const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 365;

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:8081",
    "http://localhost:3000",
    "http://0.0.0.0:8081",
    "http://127.0.0.1:8081",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("JWT_SECRET is unset or still a placeholder; refusing to start in production")]
    PlaceholderSecret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    /// `:memory:` selects a throwaway in-memory store.
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub cors_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("PORT").unwrap_or_else(|| "5000".into());
        let addr_raw = format!("{}:{}", host, port);
        let addr = addr_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST/PORT",
            expected: "a valid socket address",
            value: addr_raw.clone(),
        })?;

        let database_path = lookup("DATABASE_PATH")
            .unwrap_or_else(|| "securetransact.db".into())
            .into();

        let production = lookup("APP_ENV").is_some_and(|env| env.eq_ignore_ascii_case("production"));

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        let placeholder = jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str());
        if placeholder && production {
            return Err(ConfigError::PlaceholderSecret);
        }
        let jwt_secret = if jwt_secret.is_empty() {
            "dev-secret-change-me".to_string()
        } else {
            jwt_secret
        };

        let expiry_raw = lookup("JWT_EXPIRY_HOURS").unwrap_or_else(|| "24".into());
        let jwt_expiry_hours = expiry_raw
            .parse::<i64>()
            .ok()
            .filter(|h| (1..=MAX_JWT_EXPIRY_HOURS).contains(h))
            .ok_or(ConfigError::Invalid {
                key: "JWT_EXPIRY_HOURS",
                expected: "a number of hours between 1 and 8760",
                value: expiry_raw,
            })?;

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            addr,
            database_path,
            jwt_secret,
            jwt_expiry_hours,
            cors_origins,
            production,
        })
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        PLACEHOLDER_SECRETS.contains(&self.jwt_secret.as_str())
    }
}
