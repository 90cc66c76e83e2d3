//! Response envelope.
//!
//! # Responsibilities
//! - Wrap every API answer in `{"status", "error"?, "data"?}`
//! - Map service errors to HTTP status codes
//!
//! # Design Decisions
//! - Internal failures never leak storage details to the client
//! - The HTTP status travels next to the body, not inside it

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::service::ServiceError;

pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "Error";

/// JSON body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize = ()> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    pub code: StatusCode,
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK,
            error: None,
            data: None,
            code: StatusCode::OK,
        }
    }

    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            error: Some(message.into()),
            data: None,
            code,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "not found")
    }

    pub fn internal() -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_data(data: T) -> Self {
        Self {
            status: STATUS_OK,
            error: None,
            data: Some(data),
            code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

impl From<&ServiceError> for ApiResponse<()> {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::NotFound => ApiResponse::not_found(),
            ServiceError::AlreadyExists => ApiResponse::error(StatusCode::CONFLICT, err.to_string()),
            ServiceError::Window(window) => ApiResponse::bad_request(window.to_string()),
            ServiceError::Storage(_) => ApiResponse::internal(),
        }
    }
}

/// `data` of a successful create.
#[derive(Debug, Serialize)]
pub struct CreatedData {
    pub id: uuid::Uuid,
    pub created_at: String,
}

/// `data` of a successful sum.
#[derive(Debug, Serialize)]
pub struct SumData {
    pub total: i64,
}
