//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::RetryPolicy;

/// Root configuration for the subscription service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment environment ("local", "dev", "prod").
    pub env: String,

    /// Which subscription store to run against.
    pub storage: StorageBackend,

    /// HTTP server settings.
    pub http_server: HttpServerConfig,

    /// PostgreSQL connection settings.
    pub postgres: PostgresConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: "local".to_string(),
            storage: StorageBackend::default(),
            http_server: HttpServerConfig::default(),
            postgres: PostgresConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Subscription store implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL via the `[postgres]` section.
    #[default]
    Postgres,
    /// Process-local map; data is lost on restart.
    Memory,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Time allowed for in-flight requests to drain on shutdown, in seconds.
    pub shutdown_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 4,
            shutdown_timeout_secs: 10,
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,

    /// libpq-style ssl mode ("disable", "prefer", "require", ...).
    pub sslmode: String,

    /// Upper bound on pooled connections.
    pub max_connections: u32,

    /// How long to wait for a pooled connection, in seconds.
    pub acquire_timeout_secs: u64,

    /// Backoff policy used while establishing the first connection.
    pub retry: RetryConfig,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "postgres".to_string(),
            sslmode: "disable".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
            retry: RetryConfig::default(),
        }
    }
}

/// Connection retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of connection attempts.
    pub attempts: u32,

    /// Delay after the first failure in milliseconds.
    pub initial_delay_ms: u64,

    /// Largest delay before the schedule wraps back to `initial_delay_ms`.
    pub max_delay_ms: u64,

    /// Linear increment applied after every failure in milliseconds.
    pub step_ms: u64,

    /// Optional deadline for the whole retry loop during startup.
    pub startup_timeout_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
            step_ms: 2000,
            startup_timeout_secs: None,
        }
    }
}

impl RetryConfig {
    /// Build the runtime retry policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.attempts,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            Duration::from_millis(self.step_ms),
        )
    }

    pub fn startup_timeout(&self) -> Option<Duration> {
        self.startup_timeout_secs.map(Duration::from_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level override (trace, debug, info, warn, error).
    /// When unset the level is derived from `env`.
    pub log_level: Option<String>,

    /// Log format override ("pretty" or "json").
    /// When unset, prod logs JSON and everything else logs pretty.
    pub log_format: Option<String>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            log_format: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("env = \"prod\"").unwrap();
        assert_eq!(config.env, "prod");
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.http_server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.postgres.retry.attempts, 10);
        assert!(config.observability.log_level.is_none());
    }

    #[test]
    fn test_memory_backend() {
        let config: AppConfig = toml::from_str("storage = \"memory\"").unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(toml::from_str::<AppConfig>("storage = \"sqlite\"").is_err());
    }

    #[test]
    fn test_nested_retry_section() {
        let raw = r#"
            [postgres]
            host = "db"
            dbname = "subscriptions"

            [postgres.retry]
            attempts = 3
            initial_delay_ms = 100
            max_delay_ms = 500
            step_ms = 200
            startup_timeout_secs = 30
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.postgres.host, "db");
        assert_eq!(config.postgres.port, 5432);

        let policy = config.postgres.retry.policy();
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.initial_delay(), Duration::from_millis(100));
        assert_eq!(policy.max_delay(), Duration::from_millis(500));
        assert_eq!(policy.step(), Duration::from_millis(200));
        assert_eq!(
            config.postgres.retry.startup_timeout(),
            Some(Duration::from_secs(30))
        );
    }
}
