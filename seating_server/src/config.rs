//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use seating::{db::DatabaseConfig, table::DEFAULT_INBOX_CAPACITY};
use std::net::SocketAddr;

/// Port used when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_PORT: u16 = 5001;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Serve from process memory instead of PostgreSQL
    pub in_memory: bool,
    /// Prometheus exporter address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
    /// Bounded inbox size of each table actor
    pub table_actor_inbox: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `in_memory_override` - Optional in-memory mode override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        in_memory_override: Option<bool>,
    ) -> Result<Self, ConfigError> {
        // Bind address
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr_env("SERVER_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))),
        };

        // Database configuration
        let mut database = DatabaseConfig::from_env();
        if let Some(database_url) = database_url_override {
            database.database_url = database_url;
        }

        let in_memory =
            in_memory_override.unwrap_or_else(|| parse_env_or("SEATING_IN_MEMORY", false));
        let metrics_bind = parse_addr_env("METRICS_BIND")?;
        let table_actor_inbox = parse_env_or("TABLE_ACTOR_INBOX", DEFAULT_INBOX_CAPACITY);

        Ok(ServerConfig {
            bind,
            database,
            in_memory,
            metrics_bind,
            table_actor_inbox,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_actor_inbox == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_ACTOR_INBOX".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let Some(metrics_bind) = self.metrics_bind
            && metrics_bind == self.bind
        {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        // The pool settings only matter when PostgreSQL is used
        if self.in_memory {
            return Ok(());
        }

        if self.database.database_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "Set a PostgreSQL URL or run with --in-memory".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse an optional socket address variable; a malformed value is an error
fn parse_addr_env(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{}' is not an IP:PORT address ({})", value, e),
            }),
        Err(_) => Ok(None),
    }
}
