//! Endpoint handlers.
//!
//! Every handler takes the service, the request and its path parameters, and
//! always answers with the JSON envelope.

pub mod health;
pub mod subscriptions;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::http::response::ApiResponse;
use crate::routing::PathParams;

/// Fallback for requests no route matched.
pub async fn not_found(request: Request<Body>, _params: PathParams) -> Response {
    tracing::debug!(method = %request.method(), path = %request.uri().path(), "No route matched");
    ApiResponse::not_found().into_response()
}
