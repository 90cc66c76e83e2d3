//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum transport, timeout, body limit)
//!     → routing::Router::dispatch
//!     → middleware/ (request ID, request span + metrics)
//!     → handlers/ (request.rs: decode + validate → service call)
//!     → response.rs (JSON envelope + status)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routes;
pub mod server;

pub use middleware::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use routes::api_router;
pub use server::HttpServer;
