//! Backoff policy for scan passes that fail as a whole (e.g. the watched
//! directory is temporarily unreadable).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decision taken after a failed scan pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry(Duration),
    GiveUp,
}

/// Exponential backoff configuration for consecutive failed passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 5,
            max_delay_secs: 300,
        }
    }
}

impl RetryConfig {
    /// Compute the delay for a given retry attempt (0-indexed).
    ///
    /// Formula: `min(base_delay * 2^retry, max_delay)`
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exp_delay = self
            .base_delay_secs
            .saturating_mul(1u64.checked_shl(retry).unwrap_or(u64::MAX));
        Duration::from_secs(exp_delay.min(self.max_delay_secs))
    }

    /// What to do after `consecutive_failures` failed passes in a row (>= 1).
    pub fn next_action(&self, consecutive_failures: u32) -> RetryAction {
        if consecutive_failures == 0 || consecutive_failures > self.max_retries {
            RetryAction::GiveUp
        } else {
            RetryAction::Retry(self.delay_for_retry(consecutive_failures - 1))
        }
    }
}
