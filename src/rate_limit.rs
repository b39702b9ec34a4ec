use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Attempts allowed per window for one bucket.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    pub max_attempts: u64,
    pub window: Duration,
}

impl Policy {
    pub fn per_quarter_hour(max_attempts: u64) -> Self {
        Policy {
            max_attempts: max_attempts.max(1),
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// In-memory sliding-window limiter keyed by `bucket:client`.
#[derive(Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        // A panic elsewhere must not disable logins
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an attempt; `false` when the bucket is already full.
    pub fn check_and_record(&self, bucket: &str, client: &str, policy: Policy) -> bool {
        let mut map = self.entries();
        let now = Instant::now();
        let attempts = map.entry(format!("{}:{}", bucket, client)).or_default();
        attempts.retain(|t| now.duration_since(*t) < policy.window);

        if (attempts.len() as u64) < policy.max_attempts {
            attempts.push(now);
            true
        } else {
            false
        }
    }

    /// Drop entries older than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries().retain(|_, attempts| {
            attempts.retain(|t| now.duration_since(*t) < max_age);
            !attempts.is_empty()
        });
    }
}
