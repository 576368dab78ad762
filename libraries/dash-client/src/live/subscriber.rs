//! Live-refresh subscriber.
//!
//! Keeps one push connection open for as long as its [`LiveRefresh`] handle
//! lives. Each decoded event is offered to a [`RefreshTarget`]; relevant
//! events trigger a silent re-fetch. Nothing here is ever reported to the
//! user: connection problems lead to a reconnect after a delay, and refresh
//! failures are logged at debug level and dropped.

use super::event::LiveEvent;
use super::sse::SseDecoder;
use crate::client::DashClient;
use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Connection state of a subscriber.
///
/// `Disconnected → Connecting → Connected → (Refreshing → Connected)* → Closed`.
/// A dropped connection goes back to `Disconnected` until the reconnect
/// delay elapses. `Closed` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    Disconnected,
    Connecting,
    Connected,
    Refreshing,
    Closed,
}

/// Something a subscriber keeps in sync with the server.
#[async_trait]
pub trait RefreshTarget: Send + Sync {
    /// Whether `event` concerns what the target currently shows.
    ///
    /// Returning `false` discards the event without side effects.
    async fn is_relevant(&self, event: &LiveEvent) -> bool;

    /// Re-fetch without loading indicators or user-visible errors.
    async fn silent_refresh(&self) -> Result<()>;
}

/// Builder returned by [`DashClient::live`].
pub struct LiveRefreshBuilder {
    client: DashClient,
    session: Session,
    require_token: bool,
}

impl LiveRefreshBuilder {
    pub(crate) fn new(client: DashClient, session: Session) -> Self {
        Self {
            client,
            session,
            require_token: false,
        }
    }

    /// Close instead of connecting while the session holds no token.
    #[must_use]
    pub fn require_token(mut self, require: bool) -> Self {
        self.require_token = require;
        self
    }

    /// Start the subscriber task. Must be called within a Tokio runtime.
    pub fn spawn<T>(self, target: Arc<T>) -> LiveRefresh
    where
        T: RefreshTarget + 'static,
    {
        let (state_tx, state_rx) = watch::channel(LiveState::Disconnected);
        let cancel = CancellationToken::new();

        let worker = Worker {
            reconnect_delay: self.client.config().stream.reconnect_delay,
            client: self.client,
            session: self.session,
            require_token: self.require_token,
            target,
            state: state_tx,
            cancel: cancel.clone(),
        };

        LiveRefresh {
            state: state_rx,
            cancel,
            task: Some(tokio::spawn(worker.run())),
        }
    }
}

/// Handle to a running subscriber.
///
/// Dropping the handle tears the subscription down and releases the
/// connection. A refresh already under way is allowed to finish.
pub struct LiveRefresh {
    state: watch::Receiver<LiveState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LiveRefresh {
    pub fn state(&self) -> LiveState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn watch_state(&self) -> watch::Receiver<LiveState> {
        self.state.clone()
    }

    /// Request teardown without waiting for it.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Tear down and wait until the task has exited.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Live refresh task ended abnormally");
            }
        }
    }
}

impl Drop for LiveRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

enum ListenEnd {
    Cancelled,
    SessionChanged,
    Dropped,
}

struct Worker<T> {
    client: DashClient,
    session: Session,
    require_token: bool,
    target: Arc<T>,
    state: watch::Sender<LiveState>,
    cancel: CancellationToken,
    reconnect_delay: Duration,
}

impl<T: RefreshTarget> Worker<T> {
    async fn run(mut self) {
        let mut session_rx = self.session.subscribe();

        loop {
            session_rx.borrow_and_update();
            let token = self.session.token();

            if self.require_token && token.is_none() {
                debug!("No session token; live refresh closed");
                break;
            }

            let url = match self.client.stream_url(token.as_deref()) {
                Ok(Some(url)) => url,
                Ok(None) => {
                    debug!("No stream endpoint configured; live refresh closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Invalid stream endpoint; live refresh closed");
                    break;
                }
            };

            self.state.send_replace(LiveState::Connecting);

            match self.listen(url, &mut session_rx).await {
                ListenEnd::Cancelled => break,
                ListenEnd::SessionChanged => {
                    debug!("Session changed; reconnecting live refresh");
                }
                ListenEnd::Dropped => {
                    self.state.send_replace(LiveState::Disconnected);
                    debug!(delay_ms = self.reconnect_delay.as_millis() as u64, "Live refresh reconnect scheduled");

                    tokio::select! {
                        () = self.cancel.cancelled() => break,
                        () = session_changed(&mut session_rx) => {}
                        () = tokio::time::sleep(self.reconnect_delay) => {}
                    }
                }
            }
        }

        self.state.send_replace(LiveState::Closed);
    }

    async fn listen(
        &mut self,
        url: url::Url,
        session_rx: &mut watch::Receiver<Option<String>>,
    ) -> ListenEnd {
        let mut request = self
            .client
            .stream_http()
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::CACHE_CONTROL, "no-cache");
        if let Some(key) = &self.client.config().api_key {
            request = request.header("x-api-key", key);
        }

        let response = tokio::select! {
            () = self.cancel.cancelled() => return ListenEnd::Cancelled,
            response = request.send() => response,
        };

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "Live refresh stream rejected");
                return ListenEnd::Dropped;
            }
            Err(e) => {
                debug!(error = %e, "Live refresh connection failed");
                return ListenEnd::Dropped;
            }
        };

        self.state.send_replace(LiveState::Connected);
        info!(path = %url.path(), "Live refresh connected");

        let mut stream = std::pin::pin!(response.bytes_stream());
        let mut decoder = SseDecoder::new();

        loop {
            let chunk = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return ListenEnd::Cancelled,
                () = session_changed(session_rx) => return ListenEnd::SessionChanged,
                chunk = stream.next() => chunk,
            };

            let bytes = match chunk {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => {
                    debug!(error = %e, "Live refresh stream error");
                    return ListenEnd::Dropped;
                }
                None => {
                    debug!("Live refresh stream ended");
                    return ListenEnd::Dropped;
                }
            };

            for frame in decoder.push(&bytes) {
                let event = LiveEvent::from_frame(&frame);
                self.handle(&event).await;
            }
            if let Some(retry) = decoder.retry() {
                self.reconnect_delay = retry;
            }
        }
    }

    async fn handle(&self, event: &LiveEvent) {
        if !self.target.is_relevant(event).await {
            debug!(kind = %event.kind, entity_id = ?event.entity_id, "Live event ignored");
            return;
        }

        self.state.send_replace(LiveState::Refreshing);
        debug!(kind = %event.kind, entity_id = ?event.entity_id, "Live event; refreshing");

        if let Err(e) = self.target.silent_refresh().await {
            debug!(error = %e, "Silent refresh failed");
        }

        self.state.send_replace(LiveState::Connected);
    }
}

async fn session_changed(rx: &mut watch::Receiver<Option<String>>) {
    if rx.changed().await.is_err() {
        // Sender gone: the session can no longer change.
        std::future::pending::<()>().await;
    }
}
