//! Per-IP sliding window rate limiting.
//!
//! A true sliding window over the trailing interval, not a fixed bucket,
//! so enforcement is smooth across window boundaries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

/// A sliding window rate limiter keyed by client IP.
///
/// Each key may make at most `max_per_window` requests within the
/// trailing `window`. Timestamps are pruned lazily on each check; idle
/// keys are never evicted, so memory grows with the set of distinct
/// clients ever seen.
pub struct SlidingWindowLimiter {
    /// Admitted-request timestamps per key, unix milliseconds.
    requests: Mutex<HashMap<String, Vec<u64>>>,
    /// Maximum requests allowed per window.
    max_per_window: usize,
    /// Duration of the sliding window.
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    /// Create a new rate limiter.
    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self::with_clock(max_per_window, window, Arc::new(SystemClock))
    }

    /// Create a rate limiter with an injected clock (for tests).
    pub fn with_clock(max_per_window: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
            max_per_window,
            window,
            clock,
        }
    }

    /// Check whether a request from the given key is allowed and record it.
    ///
    /// Returns `true` if admitted. A rejected request is not recorded and
    /// does not extend the window.
    pub fn admit(&self, key: &str) -> bool {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now().as_millis() as u64;
        let cutoff = now.saturating_sub(self.window.as_millis() as u64);

        let entry = requests.entry(key.to_string()).or_default();
        entry.retain(|&t| t > cutoff);

        if entry.len() >= self.max_per_window {
            return false;
        }

        entry.push(now);
        true
    }

    /// Get the number of keys being tracked (for monitoring).
    pub fn tracked_keys(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
