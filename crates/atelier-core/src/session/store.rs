//! In-memory admin session store

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Utc};
use rand::TryRngCore;
use rand::rngs::OsRng;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::Session;
use crate::{Error, Result};

/// Number of random bytes in a session token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Default interval between expired-session sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Process-wide registry of authenticated admin sessions.
///
/// All access goes through a single reader/writer lock: lookups share it,
/// create/delete/sweep take it exclusively. Sessions are handed out as
/// clones and are never mutated after insertion.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    /// Create a store with the default 24 hour TTL
    pub fn new() -> Self {
        Self::with_ttl(chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    /// Create a store with a custom TTL
    pub fn with_ttl(ttl: chrono::Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Issue a new session for `username` and return its token
    pub async fn create_session(&self, username: &str) -> Result<String> {
        let token = generate_token()?;
        let session = Session::new(token.clone(), username, self.ttl);

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);

        info!("Created session for user: {}", username);
        Ok(token)
    }

    /// Look up a live session. Expired entries are reported as absent but
    /// left in place for the sweeper.
    pub async fn get_session(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| !s.is_expired_at(Utc::now()))
            .cloned()
    }

    /// Remove a session. Unknown tokens are ignored.
    pub async fn delete_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(token) {
            info!("Deleted session for user: {}", session.username);
        }
    }

    /// Drop every session past its expiry, returning how many were removed
    pub async fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now()).await
    }

    async fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| !session.is_evictable_at(now));

        let removed = before - sessions.len();
        debug!("Session sweep removed {} expired sessions", removed);
        removed
    }

    /// Number of stored sessions, expired or not
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Start the periodic sweep on the current tokio runtime.
    ///
    /// The task holds only a weak reference and ends once the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    debug!("Session store dropped, stopping sweeper");
                    break;
                };
                store.sweep_expired().await;
            }
        })
    }

    #[cfg(test)]
    async fn insert(&self, session: Session) {
        self.sessions.write().await.insert(session.token.clone(), session);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 32 bytes from the OS RNG, URL-safe base64 encoded
fn generate_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::TokenGeneration(e.to_string()))?;
    Ok(URL_SAFE.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = SessionStore::new();
        let token = store.create_session("admin").await.unwrap();

        let session = store.get_session(&token).await.unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.token, token);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = SessionStore::new();
        store.create_session("admin").await.unwrap();

        assert!(store.get_session("never-issued").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_not_returned_before_sweep() {
        let store = SessionStore::new();
        let expired = Session::new("old", "admin", chrono::Duration::seconds(-5));
        store.insert(expired).await;

        assert!(store.get_session("old").await.is_none());
        // Still stored until the sweep runs
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_negative_ttl_store() {
        let store = SessionStore::with_ttl(chrono::Duration::seconds(-1));
        let token = store.create_session("admin").await.unwrap();
        assert!(store.get_session(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = SessionStore::new();
        let token = store.create_session("admin").await.unwrap();

        store.delete_session(&token).await;
        store.delete_session(&token).await;
        store.delete_session("never-issued").await;

        assert!(store.get_session(&token).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = SessionStore::new();
        let live = store.create_session("admin").await.unwrap();
        store
            .insert(Session::new("old-1", "admin", chrono::Duration::seconds(-10)))
            .await;
        store
            .insert(Session::new("old-2", "admin", chrono::Duration::hours(-2)))
            .await;

        assert_eq!(store.sweep_expired().await, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.get_session(&live).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_keeps_session_expiring_at_sweep_instant() {
        let store = SessionStore::new();
        let session = Session::new("edge", "admin", chrono::Duration::minutes(5));
        let expires_at = session.expires_at;
        store.insert(session).await;

        assert_eq!(store.sweep_expired_at(expires_at).await, 0);
        assert_eq!(store.len().await, 1);
        // Reads at that instant already treat it as gone
        let stored = store.sessions.read().await.get("edge").cloned().unwrap();
        assert!(stored.is_expired_at(expires_at));

        let later = expires_at + chrono::Duration::milliseconds(1);
        assert_eq!(store.sweep_expired_at(later).await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_creates_yield_distinct_tokens() {
        let store = Arc::new(SessionStore::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let username = format!("user-{}", i);
                    let token = store.create_session(&username).await.unwrap();
                    (username, token)
                })
            })
            .collect();

        let mut tokens = HashSet::new();
        let mut issued = Vec::new();
        for handle in handles {
            let (username, token) = handle.await.unwrap();
            tokens.insert(token.clone());
            issued.push((username, token));
        }
        assert_eq!(tokens.len(), 64);

        for (username, token) in issued {
            let session = store.get_session(&token).await.unwrap();
            assert_eq!(session.username, username);
        }
    }

    #[test]
    fn test_token_format() {
        let token = generate_token().unwrap();
        // 32 bytes -> 44 base64 chars including one '=' pad
        assert_eq!(token.len(), 44);
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert_eq!(URL_SAFE.decode(&token).unwrap().len(), TOKEN_BYTES);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval() {
        let store = Arc::new(SessionStore::new());
        store
            .insert(Session::new("old", "admin", chrono::Duration::seconds(-1)))
            .await;

        let handle = store.spawn_sweeper(Duration::from_secs(3600));
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_secs(3601)).await;
        assert_eq!(store.len().await, 0);

        handle.abort();
    }
}
