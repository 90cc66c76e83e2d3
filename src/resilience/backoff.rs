//! Linear backoff with wrap-around.
//!
//! The delay grows by a fixed step after each failure. Once it would exceed the
//! configured ceiling it starts over at the initial delay. No jitter.

use std::time::Duration;

/// Retry policy: how many attempts, and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    step: Duration,
}

impl RetryPolicy {
    /// Create a new policy. `attempts` below 1 is treated as 1.
    pub fn new(attempts: u32, initial_delay: Duration, max_delay: Duration, step: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_delay,
            max_delay,
            step,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// The sequence of delays slept between consecutive attempts.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            current: self.initial_delay,
            initial: self.initial_delay,
            max: self.max_delay,
            step: self.step,
        }
    }
}

/// Endless iterator over backoff delays.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    current: Duration,
    initial: Duration,
    max: Duration,
    step: Duration,
}

impl BackoffSchedule {
    /// Return the current delay and move to the next one.
    pub fn advance(&mut self) -> Duration {
        let delay = self.current;

        let mut next = delay.saturating_add(self.step);
        if next > self.max {
            next = self.initial;
        }
        self.current = next;

        delay
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.advance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_linear_growth_then_reset() {
        let policy = RetryPolicy::new(10, secs(1), secs(10), secs(2));
        let delays: Vec<_> = policy.schedule().take(8).collect();
        assert_eq!(
            delays,
            vec![secs(1), secs(3), secs(5), secs(7), secs(9), secs(1), secs(3), secs(5)]
        );
    }

    #[test]
    fn test_delay_never_exceeds_max() {
        let policy = RetryPolicy::new(
            50,
            Duration::from_millis(150),
            Duration::from_millis(1000),
            Duration::from_millis(275),
        );
        for delay in policy.schedule().take(200) {
            assert!(delay <= policy.max_delay(), "delay {:?} above max", delay);
        }
    }

    #[test]
    fn test_exact_max_is_kept() {
        // 2 + 4 = 6 == max, so 6 is still used before wrapping.
        let policy = RetryPolicy::new(5, secs(2), secs(6), secs(4));
        let delays: Vec<_> = policy.schedule().take(4).collect();
        assert_eq!(delays, vec![secs(2), secs(6), secs(2), secs(6)]);
    }

    #[test]
    fn test_zero_step_is_constant() {
        let policy = RetryPolicy::new(3, secs(1), secs(5), Duration::ZERO);
        assert!(policy.schedule().take(10).all(|d| d == secs(1)));
    }

    #[test]
    fn test_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, secs(1), secs(1), secs(1));
        assert_eq!(policy.attempts(), 1);
    }
}
