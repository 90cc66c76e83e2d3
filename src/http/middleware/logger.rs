//! Request logging middleware.
//!
//! Runs the rest of the chain inside an `http_request` span so every event
//! emitted while handling the request carries its ID, then logs completion and
//! records request metrics.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use tracing::Instrument;

use crate::http::middleware::request_id::RequestIdExt;
use crate::observability::metrics;
use crate::routing::{BoxHandler, PathParams};

pub fn logger(next: BoxHandler) -> BoxHandler {
    Arc::new(move |request: Request<Body>, params: PathParams| {
        let next = next.clone();
        let method = request.method().clone();
        let span = tracing::info_span!(
            "http_request",
            request_id = %request.request_id(),
            method = %method,
            path = %request.uri().path(),
        );

        async move {
            let started = Instant::now();
            let response = next.call(request, params).await;
            let status = response.status();

            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), duration = ?started.elapsed(), "Request completed");
            } else {
                tracing::info!(status = status.as_u16(), duration = ?started.elapsed(), "Request completed");
            }
            metrics::record_request(&method, status, started);

            response
        }
        .instrument(span)
    })
}
