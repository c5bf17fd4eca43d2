//! Application configuration

use std::env;
use std::str::FromStr;

use account_service::AccountServiceConfig;
use common::error::{Error, Result};

/// Where accounts are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; lost on restart
    Memory,
    /// PostgreSQL via `DATABASE_URL`
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(Error::ConfigurationError(format!(
                "Unknown storage backend '{}', expected memory or postgres",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening address
    pub addr: String,
    /// Storage backend
    pub storage: StorageBackend,
    /// Apply migrations on startup (postgres only)
    pub run_migrations: bool,
    /// Account service settings
    pub accounts: AccountServiceConfig,
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let storage = match env::var("STORAGE") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Memory,
        };

        Ok(Self {
            addr: env::var("API_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            storage,
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            accounts: AccountServiceConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("Postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!(matches!(
            "redis".parse::<StorageBackend>(),
            Err(Error::ConfigurationError(_))
        ));
    }
}
