//! Session context holding the bearer token.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Explicit session context passed to every API call.
///
/// Holds at most one bearer token. Clones share the same slot, and every
/// change is published to receivers from [`Session::subscribe`], so all
/// views observe a login or logout made by any of them. Last write wins; the
/// token is opaque and never inspected or expired client-side.
#[derive(Clone)]
pub struct Session {
    slot: Arc<watch::Sender<Option<String>>>,
}

impl Session {
    /// An empty (logged out) session.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { slot: Arc::new(tx) }
    }

    /// A session that starts with a token (e.g., restored from disk).
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    /// Current token; read it before every protected request.
    pub fn token(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Replace the token. Subscribers are notified only on a real change.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        let changed = self.slot.send_if_modified(|slot| {
            if slot.as_deref() == Some(token.as_str()) {
                false
            } else {
                *slot = Some(token);
                true
            }
        });
        if changed {
            debug!("Session token updated");
        }
    }

    pub fn clear_token(&self) {
        let changed = self.slot.send_if_modified(|slot| slot.take().is_some());
        if changed {
            debug!("Session token cleared");
        }
    }

    /// Watch for token changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.slot.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
