// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Session polling and failure policies.

use std::time::Duration;

/// Floor for the poll period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Consecutive failures after which a running session closes itself.
pub const DEFAULT_FAILURE_LIMIT: u32 = 10;

/// Policy for polling the rig for status updates.
pub trait PollingPolicy: Send + Sync {
    /// Get the interval between polls.
    fn interval(&self, transmitting: bool) -> Duration;

    /// Determine if polling should occur given the current state.
    fn should_poll(&self, transmitting: bool) -> bool;
}

/// Fixed polling policy, clamped to [`MIN_POLL_INTERVAL`].
#[derive(Debug, Clone)]
pub struct FixedPolling {
    interval: Duration,
}

impl FixedPolling {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }
}

impl Default for FixedPolling {
    fn default() -> Self {
        Self::new(MIN_POLL_INTERVAL)
    }
}

impl PollingPolicy for FixedPolling {
    fn interval(&self, _transmitting: bool) -> Duration {
        self.interval
    }

    fn should_poll(&self, _transmitting: bool) -> bool {
        true
    }
}

/// Trips once `limit` consecutive commands have failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureThreshold {
    limit: u32,
}

impl FailureThreshold {
    /// A limit of zero is treated as one.
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn tripped(&self, consecutive_failures: u32) -> bool {
        consecutive_failures >= self.limit
    }
}

impl Default for FailureThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_polling_is_clamped() {
        let policy = FixedPolling::new(Duration::from_millis(10));
        assert_eq!(policy.interval(false), MIN_POLL_INTERVAL);
        assert!(policy.should_poll(true));

        let slow = FixedPolling::new(Duration::from_secs(1));
        assert_eq!(slow.interval(true), Duration::from_secs(1));
    }

    #[test]
    fn test_failure_threshold() {
        let threshold = FailureThreshold::default();
        assert!(!threshold.tripped(9));
        assert!(threshold.tripped(10));
        assert!(threshold.tripped(11));
        assert_eq!(FailureThreshold::new(0).limit(), 1);
    }
}
