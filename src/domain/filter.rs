//! Aggregation filter.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Optional inclusive bounds on one date column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether `value` satisfies every present bound.
    ///
    /// A missing value never satisfies a bound (SQL `NULL` comparison).
    pub fn contains(&self, value: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        self.from.map_or(true, |from| value >= from) && self.to.map_or(true, |to| value <= to)
    }
}

/// Filter for summing subscription prices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SumFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    /// Bounds on `start_date`.
    pub start: DateWindow,
    /// Bounds on `end_date`.
    pub end: DateWindow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::month::month_start;

    #[test]
    fn test_window_contains() {
        let jan = month_start(2024, 1);
        let jun = month_start(2024, 6);
        let dec = month_start(2024, 12);

        let window = DateWindow::new(jan, jun);
        assert!(window.contains(jan));
        assert!(window.contains(jun));
        assert!(!window.contains(dec));
        assert!(!window.contains(None));

        assert!(DateWindow::default().contains(None));
        assert!(DateWindow::new(None, jun).contains(jan));
    }
}
