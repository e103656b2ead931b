//! Runtime configuration, read from the environment (and `.env` when present).

use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Bounds on the optimistic retry loop wrapped around every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionConfig {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// sea-orm connection string; the in-memory directory is used when unset
    pub database_url: Option<String>,
    pub bind_address: SocketAddr,
    pub jwt_secret: String,
    pub transaction: TransactionConfig,
    pub notification_queue_capacity: usize,
    pub announcement_refresh: Duration,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let transaction = TransactionConfig {
            max_attempts: parse_or(&lookup, "TRANSACTION_MAX_ATTEMPTS", 3)?,
            backoff: Duration::from_millis(parse_or(&lookup, "TRANSACTION_BACKOFF_MS", 10)?),
        };
        if transaction.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "TRANSACTION_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            bind_address: parse_or(&lookup, "BIND_ADDRESS", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            jwt_secret: lookup("JWT_SECRET")
                .filter(|secret| !secret.is_empty())
                .ok_or(ConfigError::Missing("JWT_SECRET"))?,
            transaction,
            notification_queue_capacity: parse_or(&lookup, "NOTIFICATION_QUEUE_CAPACITY", 256)?,
            announcement_refresh: Duration::from_secs(parse_or(&lookup, "ANNOUNCEMENT_REFRESH_SECS", 60)?),
            log_filter: lookup("LOG_FILTER")
                .unwrap_or_else(|| "conference_central=info,sea_orm=warn".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_address, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.transaction, TransactionConfig::default());
        assert_eq!(config.notification_queue_capacity, 256);
        assert_eq!(config.announcement_refresh, Duration::from_secs(60));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/conference"),
            ("BIND_ADDRESS", "127.0.0.1:3000"),
            ("TRANSACTION_MAX_ATTEMPTS", "5"),
            ("TRANSACTION_BACKOFF_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/conference"));
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.transaction.max_attempts, 5);
        assert_eq!(config.transaction.backoff, Duration::ZERO);
    }

    #[test]
    fn missing_secret_and_bad_numbers_are_errors() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "x"), ("TRANSACTION_MAX_ATTEMPTS", "many")])),
            Err(ConfigError::Invalid { key: "TRANSACTION_MAX_ATTEMPTS", .. })
        ));
        assert!(AppConfig::from_lookup(lookup(&[("JWT_SECRET", "x"), ("TRANSACTION_MAX_ATTEMPTS", "0")])).is_err());
    }
}
