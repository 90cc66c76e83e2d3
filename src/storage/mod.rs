//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     PostgresConfig + RetryPolicy
//!     → postgres.rs (open pool, SELECT 1, inside retry_until)
//!     → Arc<dyn SubscriptionStore>
//!
//! Request:
//!     SubscriptionService
//!     → SubscriptionStore (save / get / update / delete / sum)
//!     → PgStore (sqlx) or MemoryStore (DashMap)
//! ```
//!
//! # Design Decisions
//! - One trait, two implementations with identical semantics
//! - A subscription is unique on (user_id, service_name, start_date)
//! - Sum predicates are inclusive and ANDed; no rows sums to 0

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{NewSubscription, SumFilter, Subscription};

pub use memory::MemoryStore;
pub use postgres::{ConnectError, PgStore};

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("subscription already exists")]
    AlreadyExists,
    #[error("subscription not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence for subscriptions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a new subscription, returning its id and creation time.
    async fn save(&self, subscription: NewSubscription) -> Result<(Uuid, DateTime<Utc>), StorageError>;

    async fn get(&self, id: Uuid) -> Result<Subscription, StorageError>;

    /// Overwrite every mutable field of the subscription with `subscription.id`.
    async fn update(&self, subscription: Subscription) -> Result<Subscription, StorageError>;

    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;

    /// Total `price` of subscriptions matching `filter`.
    async fn sum(&self, filter: &SumFilter) -> Result<i64, StorageError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), StorageError>;

    fn backend_type(&self) -> &'static str;
}
