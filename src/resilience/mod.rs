//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Fallible startup operation (connect + ping, run migrations):
//!     → retries.rs (run, on failure wait and try again)
//!     → backoff.rs (how long to wait before the next attempt)
//!     → success, or a single terminal error once attempts are spent
//! ```
//!
//! # Design Decisions
//! - Linear backoff that wraps to the initial delay past the ceiling; no jitter
//! - Every intermediate failure is logged, only exhaustion is fatal
//! - Cancellation is a plain future so shutdown and deadlines compose the same way

pub mod backoff;
pub mod retries;

pub use backoff::{BackoffSchedule, RetryPolicy};
pub use retries::{retry, retry_until, RetryError};
