//! Service subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handler (validated DTO → domain value)
//!     → subscription.rs (SubscriptionService)
//!     → window.rs (sum only: default + validate date windows)
//!     → SubscriptionStore
//! ```
//!
//! # Design Decisions
//! - The clock is injected so window resolution is testable
//! - Storage errors are folded into NotFound / AlreadyExists / Storage

pub mod subscription;
pub mod window;

pub use subscription::{Clock, ServiceError, SubscriptionService};
pub use window::{Axis, WindowError};
