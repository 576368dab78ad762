//! Login, registration and logout.

use crate::api::AuthApi;
use crate::error::{Result, ViewError};
use crate::notice::Notice;
use dash_client::{RegisterOutcome, Session};
use dash_core::{Credentials, Registration};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub busy: bool,
    pub notice: Option<Notice>,
}

/// Headless login/register forms plus logout.
///
/// Tokens land in (and leave) the shared [`Session`], so every page built
/// on the same session sees the change.
pub struct AuthView<A> {
    api: A,
    session: Session,
    state: RwLock<AuthState>,
}

impl<A: AuthApi> AuthView<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn notice(&self) -> Option<Notice> {
        self.state.read().await.notice.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.read().await.busy
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.begin(|| credentials.validate()).await?;
        let result = self.api.login(&self.session, credentials).await;
        self.finish(result.map(|()| Notice::success("Login successful")))
            .await
    }

    /// Register; signs in directly when the server hands out a token.
    pub async fn register(&self, registration: &Registration) -> Result<RegisterOutcome> {
        self.begin(|| registration.validate()).await?;
        let result = self.api.register(&self.session, registration).await;

        let outcome = result.as_ref().ok().cloned();
        self.finish(result.map(|outcome| match outcome {
            RegisterOutcome::SignedIn => Notice::success("Registration successful"),
            RegisterOutcome::LoginRequired => {
                Notice::info("Registration successful. Please log in.")
            }
        }))
        .await?;

        Ok(outcome.unwrap_or(RegisterOutcome::LoginRequired))
    }

    /// Best-effort server logout; the token is cleared regardless.
    pub async fn logout(&self) {
        self.api.logout(&self.session).await;
        self.state.write().await.notice = Some(Notice::info("Logged out"));
    }

    async fn begin(&self, validate: impl FnOnce() -> dash_core::Result<()>) -> Result<()> {
        let mut state = self.state.write().await;
        if state.busy {
            return Err(ViewError::Busy);
        }
        state.notice = None;

        if let Err(e) = validate() {
            state.notice = Some(Notice::error(e.to_string()));
            return Err(e.into());
        }
        state.busy = true;
        Ok(())
    }

    async fn finish(&self, result: dash_client::Result<Notice>) -> Result<()> {
        let mut state = self.state.write().await;
        state.busy = false;
        match result {
            Ok(notice) => {
                info!(notice = %notice, "Auth flow complete");
                state.notice = Some(notice);
                Ok(())
            }
            Err(e) => {
                state.notice = Some(Notice::error(e.to_string()));
                Err(e.into())
            }
        }
    }
}
