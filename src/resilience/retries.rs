//! Retry logic.
//!
//! # Responsibilities
//! - Run a fallible async operation until it succeeds or attempts run out
//! - Sleep after every failure following the policy's backoff schedule
//! - Stop early when a cancellation future fires while sleeping
//!
//! # Design Decisions
//! - Sleeping suspends only the calling task
//! - The final failure is followed by its delay too, so exhaustion takes the sum of all delays
//! - An in-flight attempt is never interrupted; cancellation is observed while waiting

use std::fmt;
use std::future::{self, Future};

use thiserror::Error;

use crate::resilience::backoff::RetryPolicy;

/// Terminal outcome of a failed retry loop.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed; carries the last error observed.
    #[error("all {attempts} retry attempts failed: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },
    /// The cancellation future fired while waiting for the next attempt.
    #[error("retry cancelled after {attempts_made} attempt(s)")]
    Cancelled { attempts_made: u32, last_error: E },
}

impl<E> RetryError<E> {
    /// The last error returned by the operation.
    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { source, .. } => source,
            RetryError::Cancelled { last_error, .. } => last_error,
        }
    }
}

/// Run `op` under `policy` with no cancellation.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    retry_until(policy, future::pending::<()>(), op).await
}

/// Run `op` under `policy`, giving up early once `cancel` completes.
///
/// `cancel` is typically a shutdown signal or a startup deadline
/// (`tokio::time::sleep(timeout)`).
pub async fn retry_until<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    cancel: C,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
    C: Future<Output = ()>,
{
    tokio::pin!(cancel);

    let attempts = policy.attempts();
    let mut schedule = policy.schedule();

    let mut attempt = 0;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let delay = schedule.advance();
        tracing::warn!(
            attempt,
            total = attempts,
            error = %err,
            delay = ?delay,
            "Attempt failed"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = &mut cancel => {
                tracing::warn!(attempt, "Retry loop cancelled");
                return Err(RetryError::Cancelled {
                    attempts_made: attempt,
                    last_error: err,
                });
            }
        }

        if attempt >= attempts {
            return Err(RetryError::Exhausted {
                attempts,
                source: err,
            });
        }
    }
}
