//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, retry bounds consistent)
//! - Validate addresses and enumerated values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, StorageBackend};

const KNOWN_ENVS: [&str; 3] = ["local", "dev", "prod"];
const KNOWN_LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `postgres.retry.attempts`).
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check the configuration for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !KNOWN_ENVS.contains(&config.env.as_str()) {
        errors.push(ValidationError::new(
            "env",
            format!("unknown environment '{}', expected one of {:?}", config.env, KNOWN_ENVS),
        ));
    }

    let http = &config.http_server;
    if http.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "http_server.bind_address",
            format!("'{}' is not a valid socket address", http.bind_address),
        ));
    }
    if http.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "http_server.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if http.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "http_server.max_body_bytes",
            "must be greater than zero",
        ));
    }

    let pg = &config.postgres;
    if config.storage == StorageBackend::Postgres {
        if pg.host.trim().is_empty() {
            errors.push(ValidationError::new("postgres.host", "must not be empty"));
        }
        if pg.dbname.trim().is_empty() {
            errors.push(ValidationError::new("postgres.dbname", "must not be empty"));
        }
    }
    if pg.max_connections == 0 {
        errors.push(ValidationError::new(
            "postgres.max_connections",
            "must be greater than zero",
        ));
    }

    let retry = &pg.retry;
    if retry.attempts == 0 {
        errors.push(ValidationError::new(
            "postgres.retry.attempts",
            "at least one attempt is required",
        ));
    }
    if retry.initial_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::new(
            "postgres.retry.initial_delay_ms",
            format!(
                "initial delay ({}ms) exceeds max delay ({}ms)",
                retry.initial_delay_ms, retry.max_delay_ms
            ),
        ));
    }
    if retry.startup_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "postgres.retry.startup_timeout_secs",
            "must be greater than zero when set",
        ));
    }

    let obs = &config.observability;
    if let Some(format) = &obs.log_format {
        if !KNOWN_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ValidationError::new(
                "observability.log_format",
                format!("unknown log format '{}'", format),
            ));
        }
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a valid socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
