//! # Fibonacci Backoff
//!
//! Requeue delays for failed reconciles. The sequence grows more slowly than
//! exponential backoff so a managed object that keeps failing against GitLab
//! is retried often enough to notice a fix, without hammering the API.
//!
//! Sequence: 1m, 1m, 2m, 3m, 5m, 8m, 10m (max). Calculated in minutes and
//! handed to the controller as a `Duration`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Fibonacci backoff calculator
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum backoff value in minutes (for reset)
    min_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
    max_minutes: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff
    ///
    /// # Arguments
    ///
    /// * `min_minutes` - First two values of the sequence (typically 1)
    /// * `max_minutes` - Cap of the sequence (typically 10)
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = Duration::from_secs(self.current_minutes * 60);

        let next_minutes = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = std::cmp::min(next_minutes, self.max_minutes);

        result
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Per-object backoff, keyed by `kind/namespace/name`
#[derive(Debug, Default)]
pub struct BackoffStates {
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffStates {
    /// Next delay for a failing object
    pub fn next_delay(&self, key: &str) -> Duration {
        match self.states.lock() {
            Ok(mut states) => states.entry(key.to_string()).or_default().next_backoff(),
            Err(poisoned) => poisoned
                .into_inner()
                .entry(key.to_string())
                .or_default()
                .next_backoff(),
        }
    }

    /// Forget the failure history of an object after a successful reconcile
    pub fn reset(&self, key: &str) {
        let mut states = match self.states.lock() {
            Ok(states) => states,
            Err(poisoned) => poisoned.into_inner(),
        };
        states.remove(key);
    }
}
