//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::updater::{ApplyOptions, UpdateMode};

/// Which document store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store backend
    pub store_backend: StoreBackend,

    /// Database connection URL (required for the postgres backend)
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// How rating and battle updates are persisted
    pub update_mode: UpdateMode,

    /// Strict-mode retries after the first attempt
    pub max_retries: u32,

    /// Strict-mode backoff before the first retry
    pub retry_base_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(_) => return Err(ConfigError::InvalidValue("STORE_BACKEND")),
        };

        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnv("DATABASE_URL"));
        }

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let update_mode = lookup("UPDATE_MODE")
            .unwrap_or_else(|| "strict".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("UPDATE_MODE"))?;

        let max_retries = lookup("MAX_RETRIES")
            .unwrap_or_else(|| "3".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_RETRIES"))?;

        let retry_base_delay_ms: u64 = lookup("RETRY_BASE_DELAY_MS")
            .unwrap_or_else(|| "50".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("RETRY_BASE_DELAY_MS"))?;

        Ok(Self {
            store_backend,
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            update_mode,
            max_retries,
            retry_base_delay: Duration::from_millis(retry_base_delay_ms),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Strict-mode retry policy
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions::new(self.max_retries, self.retry_base_delay)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/jokes")]).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.port, 3000);
        assert_eq!(config.update_mode, UpdateMode::Strict);
        assert_eq!(
            config.apply_options(),
            ApplyOptions::new(3, Duration::from_millis(50))
        );
        assert!(!config.is_production());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let result = config_from(&[]);
        assert!(matches!(result, Err(ConfigError::MissingEnv("DATABASE_URL"))));
    }

    #[test]
    fn test_memory_backend() {
        let config = config_from(&[
            ("STORE_BACKEND", "memory"),
            ("UPDATE_MODE", "last_writer_wins"),
            ("MAX_RETRIES", "0"),
            ("ENVIRONMENT", "production"),
        ])
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.update_mode, UpdateMode::LastWriterWins);
        assert_eq!(config.max_retries, 0);
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("STORE_BACKEND", "redis", "STORE_BACKEND"),
            ("UPDATE_MODE", "eventually", "UPDATE_MODE"),
            ("PORT", "http", "PORT"),
            ("MAX_RETRIES", "-1", "MAX_RETRIES"),
        ];

        for (name, value, expected) in cases {
            let result = config_from(&[
                ("STORE_BACKEND", "memory"),
                (name, value),
            ]);
            match result {
                Err(ConfigError::InvalidValue(var)) => assert_eq!(var, expected),
                other => panic!("Expected InvalidValue for {}, got: {:?}", name, other),
            }
        }
    }
}
