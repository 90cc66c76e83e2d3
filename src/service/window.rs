//! Aggregation window resolution.
//!
//! # Responsibilities
//! - Default an open-ended axis (`from` without `to`) to the current month
//! - Reject a defaulted axis whose `from` lies after the current month
//! - Reject an axis whose `to` precedes its `from`
//!
//! # Design Decisions
//! - Pure and synchronous: the caller supplies the current month
//! - The current month is taken once per call and shared by both axes
//! - Each axis is resolved on its own; one axis never reads the other

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::month::truncate_to_month;
use crate::domain::{DateWindow, SumFilter};

/// One of the two date columns a sum can be bounded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Start,
    End,
}

impl Axis {
    fn column(self) -> &'static str {
        match self {
            Axis::Start => "start_date",
            Axis::End => "end_date",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("{0}_from cannot be in the future when {0}_to is omitted")]
    FutureDate(Axis),
    #[error("{0}_to must be >= {0}_from")]
    InvalidRange(Axis),
}

impl WindowError {
    pub fn axis(&self) -> Axis {
        match self {
            WindowError::FutureDate(axis) | WindowError::InvalidRange(axis) => *axis,
        }
    }
}

/// First instant of the calendar month containing `now`, in UTC.
pub fn current_month(now: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_month(now)
}

/// Fill in and validate both axes of `filter`.
pub fn resolve(mut filter: SumFilter, current_month: DateTime<Utc>) -> Result<SumFilter, WindowError> {
    filter.start = resolve_axis(Axis::Start, filter.start, current_month)?;
    filter.end = resolve_axis(Axis::End, filter.end, current_month)?;
    Ok(filter)
}

fn resolve_axis(
    axis: Axis,
    window: DateWindow,
    current_month: DateTime<Utc>,
) -> Result<DateWindow, WindowError> {
    match (window.from, window.to) {
        (Some(from), None) => {
            if from > current_month {
                return Err(WindowError::FutureDate(axis));
            }
            tracing::info!(axis = %axis, to = %current_month, "Defaulting window end to current month");
            Ok(DateWindow::new(Some(from), Some(current_month)))
        }
        (Some(from), Some(to)) if to < from => {
            tracing::warn!(axis = %axis, %from, %to, "Window end precedes start");
            Err(WindowError::InvalidRange(axis))
        }
        _ => Ok(window),
    }
}
