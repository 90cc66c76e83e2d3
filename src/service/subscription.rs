//! Subscription service.
//!
//! Thin layer between the HTTP handlers and the store. Translates storage
//! outcomes into service errors and resolves the aggregation window.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{NewSubscription, SumFilter, Subscription, SubscriptionPatch};
use crate::service::window::{self, WindowError};
use crate::storage::{StorageError, SubscriptionStore};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Service-level error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("subscription not found")]
    NotFound,
    #[error("subscription already exists")]
    AlreadyExists,
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error("storage failure: {0}")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ServiceError::NotFound,
            StorageError::AlreadyExists => ServiceError::AlreadyExists,
            other => ServiceError::Storage(other),
        }
    }
}

fn log_failure(op: &'static str, id: Option<Uuid>, err: &ServiceError) {
    match err {
        ServiceError::Window(window) => {
            tracing::warn!(op, axis = %window.axis(), error = %err, "Invalid sum window")
        }
        ServiceError::NotFound | ServiceError::AlreadyExists => {
            tracing::warn!(op, id = ?id, error = %err, "Subscription request rejected")
        }
        ServiceError::Storage(_) => {
            tracing::error!(op, id = ?id, error = %err, "Subscription storage failure")
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    clock: Clock,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self::with_clock(store, Arc::new(Utc::now))
    }

    /// Use `clock` instead of the system time when resolving sum windows.
    pub fn with_clock(store: Arc<dyn SubscriptionStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn SubscriptionStore> {
        &self.store
    }

    pub async fn create(&self, new: NewSubscription) -> Result<(Uuid, DateTime<Utc>), ServiceError> {
        let result = self.store.save(new).await.map_err(ServiceError::from);
        match &result {
            Ok((id, _)) => tracing::info!(%id, "Subscription created"),
            Err(err) => log_failure("create", None, err),
        }
        result
    }

    pub async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError> {
        self.store.get(id).await.map_err(|err| {
            let err = ServiceError::from(err);
            log_failure("get", Some(id), &err);
            err
        })
    }

    /// Read, patch and write back.
    pub async fn update(&self, id: Uuid, patch: SubscriptionPatch) -> Result<Subscription, ServiceError> {
        let result = self.patch_stored(id, patch).await;
        match &result {
            Ok(_) => tracing::info!(%id, "Subscription updated"),
            Err(err) => log_failure("update", Some(id), err),
        }
        result
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self.store.delete(id).await.map_err(ServiceError::from);
        match &result {
            Ok(()) => tracing::info!(%id, "Subscription deleted"),
            Err(err) => log_failure("delete", Some(id), err),
        }
        result
    }

    /// Total price of matching subscriptions.
    ///
    /// Open-ended windows are closed at the current month before querying.
    pub async fn sum(&self, filter: SumFilter) -> Result<i64, ServiceError> {
        let current_month = window::current_month((self.clock)());

        let result = self.sum_resolved(filter, current_month).await;
        if let Err(err) = &result {
            log_failure("sum", None, err);
        }
        result
    }

    async fn patch_stored(&self, id: Uuid, patch: SubscriptionPatch) -> Result<Subscription, ServiceError> {
        let mut current = self.store.get(id).await?;
        patch.apply_to(&mut current);
        Ok(self.store.update(current).await?)
    }

    async fn sum_resolved(
        &self,
        filter: SumFilter,
        current_month: DateTime<Utc>,
    ) -> Result<i64, ServiceError> {
        let filter = window::resolve(filter, current_month)?;
        tracing::debug!(?filter, "Calculating subscription sum");
        Ok(self.store.sum(&filter).await?)
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }
}
