//! Subscription tracker library.
//!
//! REST backend that records users' paid service subscriptions and sums their
//! cost over month windows.

pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod service;
pub mod storage;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
