//! Subscription records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::month::format_month_year;

/// A stored subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    /// Monthly price in whole currency units.
    pub price: i64,
    pub user_id: Uuid,
    /// First month of the subscription.
    pub start_date: DateTime<Utc>,
    /// Last month of the subscription, if it has ended.
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A subscription that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub service_name: Option<String>,
    pub price: Option<i64>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    /// `Some(None)` clears the end date.
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl SubscriptionPatch {
    pub fn apply_to(self, subscription: &mut Subscription) {
        if let Some(service_name) = self.service_name {
            subscription.service_name = service_name;
        }
        if let Some(price) = self.price {
            subscription.price = price;
        }
        if let Some(user_id) = self.user_id {
            subscription.user_id = user_id;
        }
        if let Some(start_date) = self.start_date {
            subscription.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            subscription.end_date = end_date;
        }
    }
}

/// Wire representation with `MM-YYYY` dates.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub id: Uuid,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// `YYYY-MM-DD HH:MM:SS`, used for record timestamps on the wire.
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S").to_string()
}

impl From<&Subscription> for SubscriptionView {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name.clone(),
            price: sub.price,
            user_id: sub.user_id,
            start_date: format_month_year(&sub.start_date),
            end_date: sub.end_date.as_ref().map(format_month_year),
            created_at: format_timestamp(&sub.created_at),
            updated_at: format_timestamp(&sub.updated_at),
        }
    }
}
