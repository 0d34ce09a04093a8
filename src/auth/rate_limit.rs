//! Sliding-window limiter for login attempts.
//!
//! Process-local and best-effort: counters are lost on restart and are not
//! shared between instances.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::warn;

/// Attempts allowed per key inside one window.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Trailing window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Key used when the caller's address is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone)]
pub struct LoginRateLimiter {
    attempts: Arc<DashMap<String, VecDeque<Instant>>>,
    max_attempts: usize,
    window: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl LoginRateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            window,
        }
    }

    /// Record an attempt for `key` unless the window is already full.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    pub(crate) fn allow_at(&self, key: &str, now: Instant) -> bool {
        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self.attempts.entry(key.to_string()).or_default();
        let timestamps = entry.value_mut();

        if let Some(window_start) = now.checked_sub(self.window) {
            while timestamps.front().is_some_and(|t| *t < window_start) {
                timestamps.pop_front();
            }
        }

        if timestamps.len() >= self.max_attempts {
            warn!(client = %key, attempts = timestamps.len(), "login rate limit tripped");
            return false;
        }
        timestamps.push_back(now);
        true
    }

    /// Attempts currently counted for `key`.
    pub fn attempts(&self, key: &str) -> usize {
        self.attempts.get(key).map_or(0, |e| e.len())
    }
}
