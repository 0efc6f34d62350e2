//! Session token registry with TTL-based expiry.
//!
//! Maps opaque bearer tokens to user ids. Tokens are minted by the
//! credential layer in front of this service (and by tests); this registry
//! only resolves, touches, and expires them.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

struct SessionEntry {
    user_id: String,
    last_used: Instant,
}

/// Thread-safe registry of active sessions.
#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<String, SessionEntry>,
}

impl SessionManager {
    /// Creates a new empty session manager.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Registers a session for `user_id` and returns its opaque token.
    pub fn create(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                user_id: user_id.to_string(),
                last_used: Instant::now(),
            },
        );
        token
    }

    /// Resolves a token to its user id if the session has not expired.
    /// Touches the session timestamp on success; removes it on expiry.
    pub fn resolve(&self, token: &str, ttl: Duration) -> Option<String> {
        let mut entry = self.sessions.get_mut(token)?;
        if entry.last_used.elapsed() > ttl {
            drop(entry);
            self.sessions.remove(token);
            return None;
        }
        entry.last_used = Instant::now();
        Some(entry.user_id.clone())
    }

    /// Removes a session.
    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Removes all expired sessions. Returns the count removed.
    pub fn cleanup_expired(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_used.elapsed() <= ttl);
        before - self.sessions.len()
    }

    /// Returns the number of active sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn test_create_and_resolve() {
        let mgr = SessionManager::new();
        let token = mgr.create("user-1");
        assert_eq!(mgr.resolve(&token, TTL).as_deref(), Some("user-1"));
        assert!(mgr.resolve("bogus", TTL).is_none());
    }

    #[test]
    fn test_expired_session_is_removed() {
        let mgr = SessionManager::new();
        let token = mgr.create("user-1");
        std::thread::sleep(Duration::from_millis(10));

        assert!(mgr.resolve(&token, Duration::ZERO).is_none());
        assert_eq!(mgr.active_count(), 0);
    }

    #[test]
    fn test_revoke() {
        let mgr = SessionManager::new();
        let token = mgr.create("user-1");
        mgr.revoke(&token);
        assert!(mgr.resolve(&token, TTL).is_none());
    }

    #[test]
    fn test_cleanup_expired() {
        let mgr = SessionManager::new();
        mgr.create("a");
        mgr.create("b");
        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(mgr.cleanup_expired(Duration::ZERO), 2);
        assert_eq!(mgr.active_count(), 0);
    }
}
