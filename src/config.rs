use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_DATABASE_URL: &str = "sqlite://social.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8000";
const DEFAULT_TOKEN_MINUTES: &str = "30";
const DEFAULT_MAX_CONNECTIONS: &str = "5";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SECRET_KEY is missing or empty")]
    MissingSecret,

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub token_ttl_minutes: i64,
    pub max_connections: u32,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        Ok(Self {
            secret_key,
            database_url: string_or(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
            host: string_or(&lookup, "HOST", DEFAULT_HOST),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            token_ttl_minutes: parse_or(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_TOKEN_MINUTES)?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        })
    }
}

fn string_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    string_or(lookup, key, default).trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[("SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.token_ttl_minutes, 30);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_missing_secret_rejected() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingSecret)));

        let result = Config::from_lookup(lookup_from(&[("SECRET_KEY", "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn test_overrides_and_invalid_port() {
        let config = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "k"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "9500"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 9500);
        assert_eq!(config.token_ttl_minutes, 5);

        let result = Config::from_lookup(lookup_from(&[("SECRET_KEY", "k"), ("PORT", "http")]));
        match result {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "PORT"),
            other => panic!("Expected Invalid error, got {:?}", other),
        }
    }
}
