//! Profile page: the signed-in user's name and email.

use crate::api::ProfileApi;
use crate::error::{Result, ViewError};
use crate::notice::{clear_error, Notice};
use crate::sequence::RequestSequence;
use async_trait::async_trait;
use dash_client::{DashClient, EventKind, LiveEvent, LiveRefresh, RefreshTarget, Session};
use dash_core::{ProfileUpdate, User};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    pub user: Option<User>,
    pub loading: bool,
    pub busy: bool,
    pub notice: Option<Notice>,
}

/// Headless profile page.
pub struct ProfilePage<A> {
    api: A,
    session: Session,
    state: RwLock<ProfileState>,
    sequence: RequestSequence,
    visible_loads: AtomicUsize,
}

impl<A: ProfileApi> ProfilePage<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(ProfileState::default()),
            sequence: RequestSequence::new(),
            visible_loads: AtomicUsize::new(0),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn snapshot(&self) -> ProfileState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn notice(&self) -> Option<Notice> {
        self.state.read().await.notice.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.read().await.busy
    }

    /// Edit form pre-filled from the loaded user.
    pub async fn form(&self) -> Option<ProfileUpdate> {
        self.state
            .read()
            .await
            .user
            .as_ref()
            .map(|user| ProfileUpdate::new(user.name.clone(), user.email.clone()))
    }

    /// Visible load of `/auth/me`.
    ///
    /// Without a token nothing is requested: the user is cleared and the
    /// page shows "Token not found. Please log in.".
    pub async fn load(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            // Anything still in flight belongs to the old session.
            let ticket = self.sequence.begin();
            self.sequence.try_apply(ticket);

            let mut state = self.state.write().await;
            state.user = None;
            state.loading = false;
            state.notice = Some(Notice::error(ViewError::TokenNotFound.to_string()));
            return Err(ViewError::TokenNotFound);
        }

        self.fetch(true).await.map(|_| ()).map_err(ViewError::from)
    }

    /// Save name and email, then reload.
    pub async fn save(&self, update: &ProfileUpdate) -> Result<User> {
        {
            let mut state = self.state.write().await;
            if state.busy {
                return Err(ViewError::Busy);
            }
            state.notice = None;

            if !self.session.is_authenticated() {
                let err = ViewError::LoginRequired {
                    action: "update your profile",
                };
                state.notice = Some(Notice::error(err.to_string()));
                return Err(err);
            }
            if let Err(e) = update.validate() {
                state.notice = Some(Notice::error(e.to_string()));
                return Err(e.into());
            }
            state.busy = true;
        }

        match self.api.update_profile(&self.session, update).await {
            Ok(user) => {
                {
                    let mut state = self.state.write().await;
                    state.user = Some(user.clone());
                    state.notice = Some(Notice::success("Profile saved"));
                }
                info!(user_id = %user.id, "Profile saved");

                if let Err(e) = self.fetch(true).await {
                    debug!(error = %e, "Reload after profile save failed");
                }
                self.state.write().await.busy = false;
                Ok(user)
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.notice = Some(Notice::error(e.to_string()));
                state.busy = false;
                Err(e.into())
            }
        }
    }

    /// Fetch `/auth/me` and apply it unless a newer response got there
    /// first. Returns whether this response was applied.
    async fn fetch(&self, visible: bool) -> dash_client::Result<bool> {
        let ticket = self.sequence.begin();
        if visible {
            let mut state = self.state.write().await;
            self.visible_loads.fetch_add(1, Ordering::SeqCst);
            state.loading = true;
            clear_error(&mut state.notice);
        }

        let result = self.api.me(&self.session).await;

        let mut state = self.state.write().await;
        if visible && self.visible_loads.fetch_sub(1, Ordering::SeqCst) == 1 {
            state.loading = false;
        }

        match result {
            Ok(user) => {
                if !self.sequence.try_apply(ticket) {
                    debug!(ticket = ticket.get(), "Discarding stale profile");
                    return Ok(false);
                }
                debug!(user_id = %user.id, "Profile loaded");
                state.user = Some(user);
                Ok(true)
            }
            Err(e) => {
                if self.sequence.is_superseded(ticket) {
                    debug!(
                        ticket = ticket.get(),
                        error = %e,
                        "Ignoring failure of a superseded profile load"
                    );
                } else if visible {
                    state.user = None;
                    state.notice = Some(Notice::error(e.to_string()));
                }
                Err(e)
            }
        }
    }
}

impl<A: ProfileApi + 'static> ProfilePage<A> {
    /// Follow `profile_changed` events for the loaded user. The subscription
    /// only runs while the session holds a token.
    pub fn live(self: &Arc<Self>, client: &DashClient) -> LiveRefresh {
        client
            .live(&self.session)
            .require_token(true)
            .spawn(Arc::clone(self))
    }
}

#[async_trait]
impl<A: ProfileApi> RefreshTarget for ProfilePage<A> {
    /// Only changes to the user currently shown count; events without a
    /// usable user id are dropped.
    async fn is_relevant(&self, event: &LiveEvent) -> bool {
        match &self.state.read().await.user {
            Some(user) => event.concerns(&EventKind::ProfileChanged, user.id.get()),
            None => false,
        }
    }

    async fn silent_refresh(&self) -> dash_client::Result<()> {
        if self.fetch(false).await? {
            self.state.write().await.notice = Some(Notice::info("Profile updated (live)"));
        }
        Ok(())
    }
}
