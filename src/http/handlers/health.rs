//! Liveness endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::response::ApiResponse;
use crate::routing::PathParams;
use crate::service::SubscriptionService;

/// GET /health: 200 when the store answers a ping, 503 otherwise.
pub async fn health(service: SubscriptionService, _request: Request<Body>, _params: PathParams) -> Response {
    match service.ping().await {
        Ok(()) => ApiResponse::ok().into_response(),
        Err(err) => {
            tracing::error!(
                backend = service.store().backend_type(),
                error = %err,
                "Health check failed"
            );
            ApiResponse::error(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable").into_response()
        }
    }
}
