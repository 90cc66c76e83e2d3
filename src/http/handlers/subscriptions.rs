//! `/api/v1/subscription` handlers.

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use crate::domain::subscription::format_timestamp;
use crate::domain::SubscriptionView;
use crate::http::request::{path_id, read_json, CreateRequest, RequestError, SumRequest, UpdateRequest};
use crate::http::response::{ApiResponse, CreatedData, SumData};
use crate::routing::PathParams;
use crate::service::SubscriptionService;

fn rejected(op: &'static str, err: RequestError) -> Response {
    tracing::warn!(op, error = %err, "Invalid request");
    ApiResponse::bad_request(err.to_string()).into_response()
}

/// POST /api/v1/subscription
pub async fn create(service: SubscriptionService, request: Request<Body>, _params: PathParams) -> Response {
    let new = match read_json::<CreateRequest>(request).await.and_then(CreateRequest::validate) {
        Ok(new) => new,
        Err(err) => return rejected("create", err),
    };

    match service.create(new).await {
        Ok((id, created_at)) => ApiResponse::with_data(CreatedData {
            id,
            created_at: format_timestamp(&created_at),
        })
        .into_response(),
        Err(err) => ApiResponse::from(&err).into_response(),
    }
}

/// GET /api/v1/subscription/{id}
pub async fn get(service: SubscriptionService, _request: Request<Body>, params: PathParams) -> Response {
    let id = match path_id(&params) {
        Ok(id) => id,
        Err(err) => return rejected("get", err),
    };

    match service.get(id).await {
        Ok(sub) => ApiResponse::with_data(SubscriptionView::from(&sub)).into_response(),
        Err(err) => ApiResponse::from(&err).into_response(),
    }
}

/// PATCH /api/v1/subscription/{id}
pub async fn update(service: SubscriptionService, request: Request<Body>, params: PathParams) -> Response {
    let id = match path_id(&params) {
        Ok(id) => id,
        Err(err) => return rejected("update", err),
    };
    let patch = match read_json::<UpdateRequest>(request).await.and_then(UpdateRequest::validate) {
        Ok(patch) => patch,
        Err(err) => return rejected("update", err),
    };

    match service.update(id, patch).await {
        Ok(sub) => ApiResponse::with_data(SubscriptionView::from(&sub)).into_response(),
        Err(err) => ApiResponse::from(&err).into_response(),
    }
}

/// DELETE /api/v1/subscription/{id}
pub async fn delete(service: SubscriptionService, _request: Request<Body>, params: PathParams) -> Response {
    let id = match path_id(&params) {
        Ok(id) => id,
        Err(err) => return rejected("delete", err),
    };

    match service.delete(id).await {
        Ok(()) => ApiResponse::ok().into_response(),
        Err(err) => ApiResponse::from(&err).into_response(),
    }
}

/// POST /api/v1/subscription/sum
pub async fn sum(service: SubscriptionService, request: Request<Body>, _params: PathParams) -> Response {
    let filter = match read_json::<SumRequest>(request).await.and_then(SumRequest::validate) {
        Ok(filter) => filter,
        Err(err) => return rejected("sum", err),
    };

    match service.sum(filter).await {
        Ok(total) => ApiResponse::with_data(SumData { total }).into_response(),
        Err(err) => ApiResponse::from(&err).into_response(),
    }
}
