//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! --config <path> | CONFIG_PATH
//!     → loader.rs (read & deserialize TOML)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed by value to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::HttpServerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PostgresConfig;
pub use schema::RetryConfig;
pub use schema::StorageBackend;
