//! Explicit session context shared by everything that needs the current
//! principal.
//!
//! Subscribers get a [`watch::Receiver`] that observes every sign-in,
//! sign-out and detected expiry.

use std::sync::RwLock;

use chrono::Utc;
use tokio::sync::watch;

use super::error::{AuthError, GatewayError};
use super::models::{Principal, Session};

pub struct SessionContext {
    session: RwLock<Option<Session>>,
    principal_tx: watch::Sender<Option<Principal>>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (principal_tx, _) = watch::channel(None);
        Self {
            session: RwLock::new(None),
            principal_tx,
        }
    }

    /// Observe principal changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.principal_tx.subscribe()
    }

    /// Install a new session and notify subscribers.
    pub fn set(&self, session: Session) {
        let principal = session.principal.clone();
        *self.write() = Some(session);
        tracing::info!(user_id = %principal.id, "session established");
        self.principal_tx.send_replace(Some(principal));
    }

    /// Drop the current session, returning it.
    pub fn clear(&self) -> Option<Session> {
        let previous = self.write().take();
        if let Some(ref s) = previous {
            tracing::info!(user_id = %s.principal.id, "session cleared");
            self.principal_tx.send_replace(None);
        }
        previous
    }

    /// The live session, if any. An expired session is cleared on access.
    pub fn current_session(&self) -> Option<Session> {
        self.require().ok()
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.current_session().map(|s| s.principal)
    }

    /// The live session or the reason there is none.
    pub fn require(&self) -> Result<Session, GatewayError> {
        let session = self
            .session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match session {
            None => Err(GatewayError::NotSignedIn),
            Some(s) if s.is_expired_at(Utc::now()) => {
                tracing::warn!(user_id = %s.principal.id, "session expired");
                self.clear();
                Err(AuthError::SessionExpired.into())
            }
            Some(s) => Ok(s),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
