//! Fixed-window rate limiting for public mutation endpoints.
//!
//! One counter bucket per `"<action>:<identity>"` key. Limits and windows are
//! supplied per call so each action declares its own policy against the same
//! shared map. Counters are process-local and lost on restart.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u64,
    /// When the current window ends and the counter resets.
    pub reset_at: Instant,
}

struct Bucket {
    count: u64,
    reset_at: Instant,
}

/// In-memory fixed-window rate limiter.
///
/// Window boundaries are not smoothed: a client that exhausts a window just
/// before it expires can spend a fresh allowance immediately after, up to
/// twice the limit across the boundary. Accepted trade-off of the
/// fixed-window scheme.
#[derive(Clone, Default)]
pub struct RateLimiter {
    buckets: Arc<DashMap<String, Bucket>>,
}

impl RateLimiter {
    /// Creates a rate limiter with an empty bucket map.
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
        }
    }

    /// Checks and counts one request for `key`.
    ///
    /// Admitted requests increment the bucket; rejected requests do not, so a
    /// bucket's count never exceeds `limit`. Total over its inputs; there is
    /// no error path.
    pub fn check(&self, key: &str, limit: u64, window: Duration) -> Decision {
        self.check_at(key, limit, window, Instant::now())
    }

    /// Clock-explicit variant of [`check`](Self::check).
    fn check_at(&self, key: &str, limit: u64, window: Duration, now: Instant) -> Decision {
        // The entry guard holds the shard lock for the whole
        // read-modify-write, serializing concurrent checks on the same key.
        // No await may occur while it is held.
        let mut entry = self.buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            reset_at: now + window,
        });
        let bucket = entry.value_mut();

        if now > bucket.reset_at {
            // Window expired — replace
            bucket.count = 1;
            bucket.reset_at = now + window;
            return Decision {
                allowed: true,
                remaining: limit.saturating_sub(1),
                reset_at: bucket.reset_at,
            };
        }

        if bucket.count >= limit {
            return Decision {
                allowed: false,
                remaining: 0,
                reset_at: bucket.reset_at,
            };
        }

        bucket.count += 1;
        Decision {
            allowed: true,
            remaining: limit - bucket.count,
            reset_at: bucket.reset_at,
        }
    }

    /// Removes buckets whose windows have expired (background cleanup).
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.buckets.retain(|_, bucket| now <= bucket.reset_at);
    }

    /// Number of live buckets, expired or not.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_exhaustion_and_reset() {
        let limiter = RateLimiter::new();
        let base = Instant::now();

        // Calls 1-3 admitted with remaining 2, 1, 0
        for expected in [2, 1, 0] {
            let d = limiter.check_at("register:1.2.3.4", 3, WINDOW, base);
            assert!(d.allowed);
            assert_eq!(d.remaining, expected);
        }

        // Call 4 rejected, remaining 0, reset unchanged
        let d = limiter.check_at("register:1.2.3.4", 3, WINDOW, base);
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
        assert_eq!(d.reset_at, base + WINDOW);

        // Past the reset the window is fresh
        let d = limiter.check_at(
            "register:1.2.3.4",
            3,
            WINDOW,
            base + WINDOW + Duration::from_secs(1),
        );
        assert!(d.allowed);
        assert_eq!(d.remaining, 2);
    }

    #[test]
    fn test_rejected_calls_not_counted() {
        let limiter = RateLimiter::new();
        let base = Instant::now();

        for _ in 0..2 {
            limiter.check_at("subscribe:ip", 2, WINDOW, base);
        }
        // Hammering past the limit leaves the bucket at the limit
        for _ in 0..10 {
            assert!(!limiter.check_at("subscribe:ip", 2, WINDOW, base).allowed);
        }
        // A fresh window still admits normally
        let d = limiter.check_at(
            "subscribe:ip",
            2,
            WINDOW,
            base + WINDOW + Duration::from_millis(1),
        );
        assert!(d.allowed);
        assert_eq!(d.remaining, 1);
    }

    #[test]
    fn test_remaining_strictly_decreases() {
        let limiter = RateLimiter::new();
        let base = Instant::now();
        let mut last = u64::MAX;
        for _ in 0..5 {
            let d = limiter.check_at("k", 5, WINDOW, base);
            assert!(d.allowed);
            assert!(d.remaining < last);
            last = d.remaining;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        let base = Instant::now();

        limiter.check_at("register:a", 1, WINDOW, base);
        assert!(!limiter.check_at("register:a", 1, WINDOW, base).allowed);

        // Same identity, different action
        assert!(limiter.check_at("subscribe:a", 1, WINDOW, base).allowed);
        // Same action, different identity
        assert!(limiter.check_at("register:b", 1, WINDOW, base).allowed);
    }

    #[test]
    fn test_cleanup_drops_expired_buckets() {
        let limiter = RateLimiter::new();
        limiter.check("old", 3, Duration::ZERO);
        limiter.check("fresh", 3, WINDOW);
        assert_eq!(limiter.bucket_count(), 2);

        std::thread::sleep(Duration::from_millis(10));
        limiter.cleanup();
        assert_eq!(limiter.bucket_count(), 1);
    }
}
