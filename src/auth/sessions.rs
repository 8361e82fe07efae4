use std::collections::HashMap;

use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no active session for {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
    pub expires: OffsetDateTime,
}

impl Session {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires
    }
}

/// Live sessions, one per username. Owned by the application state for the
/// lifetime of the process.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: HashMap::new(),
        }
    }

    /// Starts a session, replacing any earlier one for the same user.
    pub fn start(&mut self, username: &str, now: OffsetDateTime) -> Session {
        let session = Session {
            username: username.to_string(),
            token: Uuid::new_v4().to_string(),
            expires: now + self.ttl,
        };
        if self
            .sessions
            .insert(username.to_string(), session.clone())
            .is_some()
        {
            debug!(username, "previous session replaced");
        }
        session
    }

    /// Username behind a live token.
    pub fn check(&self, token: &str, now: OffsetDateTime) -> Option<&str> {
        self.sessions
            .values()
            .find(|s| s.token == token && !s.is_expired(now))
            .map(|s| s.username.as_str())
    }

    pub fn end(&mut self, username: &str) -> Result<Session, SessionError> {
        self.sessions
            .remove(username)
            .ok_or_else(|| SessionError::NotFound(username.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
