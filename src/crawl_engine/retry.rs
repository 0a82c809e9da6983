//! Bounded retry policy
//!
//! A `RetryPolicy` is a plain value: how many attempts a unit of work gets
//! and how long to wait between them. The region crawler and detail fetcher
//! drive their own loops and consult the policy between attempts, since the
//! recovery step between attempts (rebuilding or recycling a page handle)
//! differs per caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::sleep_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        let max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        Self {
            max_attempts,
            backoff,
        }
    }

    /// One attempt, no retry
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Wait the fixed backoff
    pub async fn pause(&self) {
        sleep_for(self.backoff).await;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}
