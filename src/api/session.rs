//! In-memory session store.
//!
//! Clients hold an opaque random token; only its SHA-256 digest is kept here,
//! so a dump of the map cannot be replayed.

use dashmap::DashMap;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::constants::session::TOKEN_BYTES;

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    to_hex(&bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session and return the client token.
    pub fn create(&self, user_id: &str) -> String {
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            Session {
                user_id: user_id.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// User owning `token`, dropping the session if it has expired.
    pub fn user_id(&self, token: &str) -> Option<String> {
        let key = hash_token(token);
        let session = self.sessions.get(&key)?.clone();
        if session.expires_at <= Instant::now() {
            self.sessions.remove(&key);
            debug!("Session expired for user {}", session.user_id);
            return None;
        }
        Some(session.user_id)
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        // sessions created during the sweep can outnumber the removed ones
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
