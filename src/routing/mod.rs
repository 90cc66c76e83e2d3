//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     RouterBuilder::middleware / route / fallback
//!     → build(): wrap every handler in the middleware chain
//!     → Freeze as immutable Router
//!
//! Incoming Request (method, path)
//!     → router.rs (per-method route list, registration order)
//!     → matcher.rs (segment-by-segment match, bind captures)
//!     → handler(request, PathParams) or fallback(request, empty params)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (literal and `{name}` segments only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order, not specificity)
//! - Unmatched requests still pass through the middleware chain

pub mod matcher;
pub mod params;
pub mod router;

pub use matcher::PathPattern;
pub use params::PathParams;
pub use router::{BoxHandler, Handler, HandlerFuture, Middleware, RouteMatch, Router, RouterBuilder};
