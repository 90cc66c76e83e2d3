//! Domain model.
//!
//! Plain data shared by the HTTP layer, the service and the stores. No I/O.

pub mod filter;
pub mod month;
pub mod subscription;

pub use filter::{DateWindow, SumFilter};
pub use month::{format_month_year, parse_month_year, MonthYearError};
pub use subscription::{NewSubscription, Subscription, SubscriptionPatch, SubscriptionView};
