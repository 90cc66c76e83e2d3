//! API route table.

use std::future::Future;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::http::handlers::{self, health, subscriptions};
use crate::http::middleware;
use crate::routing::{Handler, PathParams, Router};
use crate::service::SubscriptionService;

/// Bind a service-taking handler to `service`.
fn with_service<F, Fut>(service: &SubscriptionService, handler: F) -> impl Handler
where
    F: Fn(SubscriptionService, Request<Body>, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let service = service.clone();
    move |request: Request<Body>, params: PathParams| handler(service.clone(), request, params)
}

/// Build the frozen router serving the whole API.
///
/// `/api/v1/subscription/sum` is registered before `/api/v1/subscription/{id}`;
/// they differ in method today, but the order keeps `sum` from being read as an id.
pub fn api_router(service: SubscriptionService) -> Router {
    Router::builder()
        .middleware(middleware::request_id)
        .middleware(middleware::logger)
        .get("/health", with_service(&service, health::health))
        .post("/api/v1/subscription/sum", with_service(&service, subscriptions::sum))
        .post("/api/v1/subscription", with_service(&service, subscriptions::create))
        .get("/api/v1/subscription/{id}", with_service(&service, subscriptions::get))
        .patch("/api/v1/subscription/{id}", with_service(&service, subscriptions::update))
        .delete("/api/v1/subscription/{id}", with_service(&service, subscriptions::delete))
        .fallback(handlers::not_found)
        .build()
}
