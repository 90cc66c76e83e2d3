//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Derive the default level and output format from the environment name
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for local and dev
//! - `RUST_LOG` wins over config; config wins over the environment default

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for development.
    Pretty,
    /// One JSON object per event, for log aggregation.
    Json,
}

/// Level used when neither `RUST_LOG` nor `observability.log_level` is set.
pub fn default_level(env: &str) -> &'static str {
    match env {
        "local" => "trace",
        "dev" => "debug",
        _ => "info",
    }
}

/// Filter directive derived from config.
pub fn filter_directive(config: &AppConfig) -> String {
    config
        .observability
        .log_level
        .clone()
        .unwrap_or_else(|| default_level(&config.env).to_string())
}

pub fn log_format(config: &AppConfig) -> LogFormat {
    match config.observability.log_format.as_deref() {
        Some("json") => LogFormat::Json,
        Some(_) => LogFormat::Pretty,
        None if config.env == "prod" => LogFormat::Json,
        None => LogFormat::Pretty,
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &AppConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format(config) {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
    }
}
