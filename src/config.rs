//! Runtime configuration from the environment (a `.env` file is honoured).

use crate::error::{AppError, ConfigError};
use crate::state::AppState;
use crate::store::{ensure_database_exists, ensure_schema, MemoryStore, PgStore, Store, StoreBackend};
use std::str::FromStr;
use std::sync::Arc;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/space_missions";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5555";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub backend: StoreBackend,
    pub bind_addr: String,
    pub max_connections: u32,
    pub body_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.into(),
            backend: StoreBackend::Postgres,
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

fn parsed<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        Ok(AppConfig {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            backend: parsed("STORE_BACKEND", lookup("STORE_BACKEND"), defaults.backend)?,
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parsed("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), defaults.max_connections)?,
            body_limit: parsed("BODY_LIMIT_BYTES", lookup("BODY_LIMIT_BYTES"), defaults.body_limit)?,
        })
    }

    /// Opens the configured store. For Postgres this creates the database and tables if needed.
    pub async fn connect_store(&self) -> Result<Arc<dyn Store>, AppError> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreBackend::Postgres => {
                ensure_database_exists(&self.database_url).await?;
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(self.max_connections)
                    .connect(&self.database_url)
                    .await?;
                ensure_schema(&pool).await?;
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    pub async fn app_state(&self) -> Result<AppState, AppError> {
        Ok(AppState::new(self.connect_store().await?))
    }
}

/// Installs the global fmt subscriber; `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STORE_BACKEND", "Memory"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("DB_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn test_invalid_values_name_the_key() {
        let err = AppConfig::from_lookup(lookup(&[("STORE_BACKEND", "sqlite")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORE_BACKEND", .. }));
        let err = AppConfig::from_lookup(lookup(&[("BODY_LIMIT_BYTES", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BODY_LIMIT_BYTES", .. }));
    }
}
