//! Request bodies and their validation.
//!
//! # Responsibilities
//! - Deserialize JSON bodies into request DTOs
//! - Validate every field and collect all problems before answering
//! - Convert validated DTOs into domain values
//!
//! # Design Decisions
//! - DTO fields are optional so a missing field is a validation error, not a JSON error
//! - Dates travel as `MM-YYYY` and become the first instant of the month in UTC
//! - Error text: `field X is a required field` / `field X is not valid`, joined by `, `

use axum::body::Body;
use axum::http::Request;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{parse_month_year, DateWindow, NewSubscription, SumFilter, SubscriptionPatch};
use crate::routing::PathParams;

/// Why a request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid json")]
    InvalidJson,
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("id is required")]
    MissingId,
    #[error("invalid id")]
    InvalidId,
}

#[derive(Debug, Default)]
struct FieldErrors(Vec<String>);

impl FieldErrors {
    fn required(&mut self, field: &str) {
        self.0.push(format!("field {field} is a required field"));
    }

    fn invalid(&mut self, field: &str) {
        self.0.push(format!("field {field} is not valid"));
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, RequestError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(RequestError::Validation(self.0))
        }
    }
}

/// Read the whole body and decode it as JSON.
pub async fn read_json<T: DeserializeOwned>(request: Request<Body>) -> Result<T, RequestError> {
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|_| RequestError::InvalidJson)?;
    serde_json::from_slice(&bytes).map_err(|err| {
        tracing::debug!(error = %err, "Rejected request body");
        RequestError::InvalidJson
    })
}

/// The `{id}` path parameter as a UUID.
pub fn path_id(params: &PathParams) -> Result<Uuid, RequestError> {
    match params.get("id") {
        None | Some("") => Err(RequestError::MissingId),
        Some(raw) => Uuid::parse_str(raw).map_err(|_| RequestError::InvalidId),
    }
}

fn parse_uuid(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    let parsed = Uuid::parse_str(raw).ok();
    if parsed.is_none() {
        errors.invalid(field);
    }
    parsed
}

fn parse_month(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<chrono::DateTime<chrono::Utc>> {
    let parsed = parse_month_year(raw).ok();
    if parsed.is_none() {
        errors.invalid(field);
    }
    parsed
}

/// Body of `POST /api/v1/subscription`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRequest {
    pub service_name: Option<String>,
    pub price: Option<i64>,
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CreateRequest {
    pub fn validate(self) -> Result<NewSubscription, RequestError> {
        let mut errors = FieldErrors::default();

        let service_name = match self.service_name {
            Some(name) if !name.is_empty() => Some(name),
            _ => {
                errors.required("service_name");
                None
            }
        };

        let price = match self.price {
            None => {
                errors.required("price");
                None
            }
            Some(price) if price < 0 => {
                errors.invalid("price");
                None
            }
            Some(price) => Some(price),
        };

        let user_id = match self.user_id.as_deref() {
            None | Some("") => {
                errors.required("user_id");
                None
            }
            Some(raw) => parse_uuid("user_id", raw, &mut errors),
        };

        let start_date = match self.start_date.as_deref() {
            None | Some("") => {
                errors.required("start_date");
                None
            }
            Some(raw) => parse_month("start_date", raw, &mut errors),
        };

        let end_date = match self.end_date.as_deref() {
            None | Some("") => None,
            Some(raw) => parse_month("end_date", raw, &mut errors),
        };

        errors.finish(|| NewSubscription {
            service_name: service_name.unwrap_or_default(),
            price: price.unwrap_or_default(),
            user_id: user_id.unwrap_or_default(),
            start_date: start_date.unwrap_or_default(),
            end_date,
        })
    }
}

/// Body of `PATCH /api/v1/subscription/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    pub service_name: Option<String>,
    pub price: Option<i64>,
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    /// `""` clears the end date.
    pub end_date: Option<String>,
}

impl UpdateRequest {
    pub fn validate(self) -> Result<SubscriptionPatch, RequestError> {
        let mut errors = FieldErrors::default();
        let mut patch = SubscriptionPatch::default();

        if let Some(name) = self.service_name {
            if name.is_empty() {
                errors.invalid("service_name");
            } else {
                patch.service_name = Some(name);
            }
        }

        if let Some(price) = self.price {
            if price < 1 {
                errors.invalid("price");
            } else {
                patch.price = Some(price);
            }
        }

        if let Some(raw) = self.user_id.as_deref() {
            patch.user_id = parse_uuid("user_id", raw, &mut errors);
        }

        if let Some(raw) = self.start_date.as_deref() {
            patch.start_date = parse_month("start_date", raw, &mut errors);
        }

        match self.end_date.as_deref() {
            None => {}
            Some("") => patch.end_date = Some(None),
            Some(raw) => {
                if let Some(end) = parse_month("end_date", raw, &mut errors) {
                    patch.end_date = Some(Some(end));
                }
            }
        }

        errors.finish(|| patch)
    }
}

/// Body of `POST /api/v1/subscription/sum`.
#[derive(Debug, Default, Deserialize)]
pub struct SumRequest {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub start_date_from: Option<String>,
    pub start_date_to: Option<String>,
    pub end_date_from: Option<String>,
    pub end_date_to: Option<String>,
}

impl SumRequest {
    pub fn validate(self) -> Result<SumFilter, RequestError> {
        let mut errors = FieldErrors::default();

        let user_id = self
            .user_id
            .as_deref()
            .and_then(|raw| parse_uuid("user_id", raw, &mut errors));

        let service_name = match self.service_name {
            Some(name) if name.is_empty() => {
                errors.invalid("service_name");
                None
            }
            other => other,
        };

        let mut month = |field: &str, raw: Option<&str>| {
            raw.and_then(|raw| parse_month(field, raw, &mut errors))
        };
        let start = DateWindow::new(
            month("start_date_from", self.start_date_from.as_deref()),
            month("start_date_to", self.start_date_to.as_deref()),
        );
        let end = DateWindow::new(
            month("end_date_from", self.end_date_from.as_deref()),
            month("end_date_to", self.end_date_to.as_deref()),
        );

        errors.finish(|| SumFilter {
            user_id,
            service_name,
            start,
            end,
        })
    }
}
