//! Bearer-token session shared by remote sources
//!
//! The admin client signs in elsewhere and hands the resulting token to a
//! [`SessionContext`]. Sources receive the context at construction and read
//! the token at call time, so `clear` on sign-out takes effect for every
//! source at once.

use crate::core::error::SessionError;
use chrono::{DateTime, Utc};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

#[derive(Debug, Clone)]
struct SessionState {
    token: String,
    established_at: DateTime<Utc>,
}

/// Process-wide credential holder
///
/// Cheap to clone; all clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    state: Arc<RwLock<Option<SessionState>>>,
}

impl SessionContext {
    /// Create an empty, independent session
    pub fn new() -> Self {
        Self::default()
    }

    /// The session shared by the whole process
    pub fn global() -> &'static SessionContext {
        static GLOBAL: OnceLock<SessionContext> = OnceLock::new();
        GLOBAL.get_or_init(SessionContext::new)
    }

    /// Start a session with the given token, replacing any previous one
    ///
    /// A blank token leaves the session cleared.
    pub fn init(&self, token: impl Into<String>) {
        let token = token.into();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if token.trim().is_empty() {
            tracing::warn!("ignoring blank session token");
            *state = None;
            return;
        }
        *state = Some(SessionState {
            token,
            established_at: Utc::now(),
        });
        tracing::debug!("session initialized");
    }

    /// End the session
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.take().is_some() {
            tracing::debug!("session cleared");
        }
    }

    pub fn is_active(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The raw token
    pub fn token(&self) -> Result<String, SessionError> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(SessionError::NotInitialized)
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> Result<String, SessionError> {
        self.token().map(|token| format!("Bearer {}", token))
    }

    /// When the current session was started
    pub fn established_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.established_at)
    }
}
