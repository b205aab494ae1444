// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// Retry and throttling configuration for the page loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per page, first try included.
    pub max_attempts: u32,
    /// Base unit of the quadratic backoff: wait `attempt² × base` after the
    /// given attempt fails.
    pub backoff_base: Duration,
    /// Fixed delay between successful pages, throttling the remote server.
    pub page_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            page_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn standard() -> Self {
        Self::default()
    }

    /// Millisecond-scale delays for tests.
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(1),
            page_delay: Duration::from_millis(1),
        }
    }

    /// Backoff after a failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * (attempt * attempt)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
