//! Router middleware.
//!
//! Registered in this order so the request ID exists before the logging span opens:
//! `request_id` → `logger` → handler.

pub mod logger;
pub mod request_id;

pub use logger::logger;
pub use request_id::{request_id, RequestId, RequestIdExt, X_REQUEST_ID};
