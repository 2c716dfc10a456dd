//! # Configuration
//!
//! Layered application settings.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config/cards.toml`, or the file named by `CARDS_CONFIG` (optional)
//! 3. environment variables prefixed `CARDS__`, with `__` between keys
//!
//! A `.env` file is loaded into the environment before any source is read.
//!
//! ```text
//! CARDS__SERVER__BIND=0.0.0.0:8080
//! CARDS__STORE__BACKEND=postgres
//! CARDS__STORE__ENDPOINTS=postgres://db-a/cards,postgres://db-b/cards
//! CARDS__SELECTION__ORDER_MAX=5
//! CARDS__LOGGING__FORMAT=json
//! ```

use crate::infrastructure::persistence::postgres::PostgresStoreConfig;
use crate::infrastructure::telemetry::LogFormat;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/cards.toml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_FILE_ENV: &str = "CARDS_CONFIG";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CARDS";

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// The merged settings are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local store; contents are lost on exit.
    #[default]
    InMemory,
    /// PostgreSQL column table.
    Postgres,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_owned(),
        }
    }
}

/// Store handle settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to open.
    pub backend: StoreBackend,
    /// Connection URLs, tried in order.
    pub endpoints: Vec<String>,
    /// Connection pool size.
    pub max_connections: u32,
    /// Connect and acquire timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Create the column table on startup when missing.
    pub ensure_schema: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            endpoints: Vec::new(),
            max_connections: 10,
            connect_timeout_ms: 5_000,
            ensure_schema: true,
        }
    }
}

impl StoreConfig {
    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the PostgreSQL connection settings.
    #[must_use]
    pub fn postgres(&self) -> PostgresStoreConfig {
        PostgresStoreConfig {
            endpoints: self.endpoints.clone(),
            max_connections: self.max_connections,
            connect_timeout: self.connect_timeout(),
        }
    }
}

/// Random selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Lowest order value drawn.
    pub order_min: i64,
    /// Highest order value drawn.
    pub order_max: i64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            order_min: crate::domain::entities::descriptor::DEFAULT_ORDER_MIN,
            order_max: crate::domain::entities::descriptor::DEFAULT_ORDER_MAX,
        }
    }
}

impl SelectionConfig {
    /// Returns the inclusive order range.
    #[must_use]
    pub fn order_range(&self) -> RangeInclusive<i64> {
        self.order_min..=self.order_max
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter directive; `RUST_LOG` overrides it.
    pub filter: Option<String>,
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server.
    pub server: ServerConfig,
    /// Store handle.
    pub store: StoreConfig,
    /// Random selection.
    pub selection: SelectionConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `.env`, then merges the configuration file and the process
    /// environment over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or the merged
    /// settings fail validation.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = std::env::var_os(CONFIG_FILE_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
        Self::from_sources(Some(&path), environment())
    }

    /// Merges an optional configuration file and an environment source
    /// over the defaults, then validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or the merged
    /// settings fail validation.
    pub fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.store.backend == StoreBackend::Postgres && self.store.endpoints.is_empty() {
            return Err(ConfigError::invalid(
                "store.endpoints must list at least one endpoint for the postgres backend",
            ));
        }
        if self.store.max_connections == 0 {
            return Err(ConfigError::invalid("store.max_connections must be positive"));
        }
        if self.selection.order_min > self.selection.order_max {
            return Err(ConfigError::invalid(format!(
                "selection.order_min ({}) exceeds selection.order_max ({})",
                self.selection.order_min, self.selection.order_max
            )));
        }
        Ok(())
    }

    /// Returns the parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e| ConfigError::invalid(format!("server.bind {:?}: {e}", self.server.bind)))
    }
}

/// Environment source for the `CARDS__` prefix.
#[must_use]
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("store.endpoints")
        .try_parsing(true)
}
