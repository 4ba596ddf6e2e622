//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated admin session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token handed to the client
    pub token: String,
    /// Username the session was issued to
    pub username: String,
    /// Absolute expiry time
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session expiring `ttl` from now
    pub fn new(token: impl Into<String>, username: impl Into<String>, ttl: chrono::Duration) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            expires_at: Utc::now() + ttl,
        }
    }

    /// A session is valid strictly before its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The sweep only evicts sessions strictly past their expiry instant
    pub fn is_evictable_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = Session::new("tok", "admin", chrono::Duration::hours(24));
        assert_eq!(session.token, "tok");
        assert_eq!(session.username, "admin");
        assert!(!session.is_expired());
    }

    #[test]
    fn test_expiry_boundary() {
        let session = Session::new("tok", "admin", chrono::Duration::hours(1));
        assert!(!session.is_expired_at(session.expires_at - chrono::Duration::seconds(1)));
        assert!(session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(session.expires_at + chrono::Duration::seconds(1)));

        assert!(!session.is_evictable_at(session.expires_at));
        assert!(session.is_evictable_at(session.expires_at + chrono::Duration::seconds(1)));
    }
}
