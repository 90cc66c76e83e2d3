//! Request ID middleware.
//! Tags every request with an `X-Request-ID`, reusing the client's when present.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use uuid::Uuid;

use crate::routing::{BoxHandler, PathParams};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID stored in the request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Convenience accessor for handlers and later middleware.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .map(RequestId::as_str)
            .unwrap_or("unknown")
    }
}

fn incoming_id(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Ensure the request carries an ID and echo it on the response.
pub fn request_id(next: BoxHandler) -> BoxHandler {
    Arc::new(move |mut request: Request<Body>, params: PathParams| {
        let next = next.clone();
        async move {
            let id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());
            request.extensions_mut().insert(RequestId(id.clone()));

            let mut response = next.call(request, params).await;
            if let Ok(value) = HeaderValue::from_str(&id) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            response
        }
    })
}
