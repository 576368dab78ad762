//! Tests for the live-refresh subscriber against a mock SSE endpoint.

use async_trait::async_trait;
use dash_client::{
    ClientConfig, ClientError, DashClient, EventKind, LiveEvent, LiveState, RefreshTarget,
    Session, StreamConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every event it sees; refreshes on product changes only.
#[derive(Default)]
struct RecordingTarget {
    seen: Mutex<Vec<LiveEvent>>,
    refreshes: AtomicUsize,
    fail_refresh: bool,
}

impl RecordingTarget {
    fn failing() -> Self {
        Self {
            fail_refresh: true,
            ..Self::default()
        }
    }

    fn seen(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshTarget for RecordingTarget {
    async fn is_relevant(&self, event: &LiveEvent) -> bool {
        self.seen.lock().unwrap().push(event.clone());
        event.kind == EventKind::ProductsChanged
    }

    async fn silent_refresh(&self) -> dash_client::Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            Err(ClientError::AuthRequired)
        } else {
            Ok(())
        }
    }
}

fn sse(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

fn client_with_stream(server: &MockServer, stream: StreamConfig) -> DashClient {
    DashClient::new(ClientConfig::new(server.uri()).with_stream(stream)).unwrap()
}

fn slow_reconnect() -> StreamConfig {
    StreamConfig {
        reconnect_delay: Duration::from_secs(60),
        ..StreamConfig::default()
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn wait_for_state(live: &dash_client::LiveRefresh, expected: LiveState) {
    let mut rx = live.watch_state();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == expected))
        .await
        .expect("state not reached in time")
        .expect("state channel closed");
}

// =============================================================================
// Event Dispatch Tests
// =============================================================================

mod dispatch {
    use super::*;

    #[tokio::test]
    async fn test_relevant_events_trigger_silent_refresh() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .and(header("Accept", "text/event-stream"))
            .respond_with(sse(
                "event: products_changed\ndata: {\"productId\": 4}\n\n\
                 event: profile_changed\ndata: {\"userId\": 2}\n\n",
            ))
            .mount(&server)
            .await;

        let target = Arc::new(RecordingTarget::default());
        let live = client_with_stream(&server, slow_reconnect())
            .live(&Session::new())
            .spawn(Arc::clone(&target));

        eventually(|| target.seen() == 2).await;
        wait_for_state(&live, LiveState::Disconnected).await;

        assert_eq!(target.refreshes(), 1);
        let seen = target.seen.lock().unwrap().clone();
        assert_eq!(seen[0].entity_id, Some(4));
        assert_eq!(seen[1].kind, EventKind::ProfileChanged);
        assert_eq!(seen[1].entity_id, Some(2));

        live.shutdown().await;
    }

    #[tokio::test]
    async fn test_refresh_failure_is_swallowed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .respond_with(sse(
                "event: products_changed\ndata: {}\n\nevent: products_changed\ndata: {}\n\n",
            ))
            .mount(&server)
            .await;

        let target = Arc::new(RecordingTarget::failing());
        let live = client_with_stream(&server, slow_reconnect())
            .live(&Session::new())
            .spawn(Arc::clone(&target));

        eventually(|| target.refreshes() == 2).await;
        assert_ne!(live.state(), LiveState::Closed);

        live.shutdown().await;
    }

    #[tokio::test]
    async fn test_token_and_api_key_sent_on_stream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .and(query_param("token", "jwt_abc"))
            .and(header("x-api-key", "key_abc"))
            .respond_with(sse("event: products_changed\ndata: {}\n\n"))
            .expect(1..)
            .mount(&server)
            .await;

        let client = DashClient::new(
            ClientConfig::new(server.uri())
                .with_api_key(Some("key_abc".to_string()))
                .with_stream(StreamConfig {
                    include_token: true,
                    ..slow_reconnect()
                }),
        )
        .unwrap();

        let target = Arc::new(RecordingTarget::default());
        let live = client
            .live(&Session::with_token("jwt_abc"))
            .require_token(true)
            .spawn(Arc::clone(&target));

        eventually(|| target.refreshes() == 1).await;
        live.shutdown().await;
    }
}

// =============================================================================
// Reconnect Tests
// =============================================================================

mod reconnect {
    use super::*;

    #[tokio::test]
    async fn test_rejected_stream_is_retried_after_delay() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_with_stream(
            &server,
            StreamConfig {
                reconnect_delay: Duration::from_millis(20),
                ..StreamConfig::default()
            },
        );
        let live = client
            .live(&Session::new())
            .spawn(Arc::new(RecordingTarget::default()));

        let mut attempts = 0;
        tokio::time::timeout(Duration::from_secs(5), async {
            while attempts < 3 {
                attempts = server.received_requests().await.unwrap_or_default().len();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("stream was not retried");

        assert_ne!(live.state(), LiveState::Closed);
        live.shutdown().await;
    }

    #[tokio::test]
    async fn test_server_retry_overrides_configured_delay() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .respond_with(sse("retry: 20\ndata: {}\n\n"))
            .mount(&server)
            .await;

        let target = Arc::new(RecordingTarget::default());
        let live = client_with_stream(&server, slow_reconnect())
            .live(&Session::new())
            .spawn(Arc::clone(&target));

        // Configured delay is a minute; only the server's 20ms gets us here.
        eventually(|| target.seen() >= 2).await;

        live.shutdown().await;
    }
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_closes_without_token_when_required() {
        let server = MockServer::start().await;

        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let live = client_with_stream(&server, slow_reconnect())
            .live(&Session::new())
            .require_token(true)
            .spawn(Arc::new(RecordingTarget::default()));

        wait_for_state(&live, LiveState::Closed).await;
    }

    #[tokio::test]
    async fn test_closes_without_stream_endpoint() {
        let server = MockServer::start().await;

        let stream = StreamConfig {
            path: None,
            ..StreamConfig::default()
        };
        let live = client_with_stream(&server, stream)
            .live(&Session::with_token("jwt_abc"))
            .spawn(Arc::new(RecordingTarget::default()));

        wait_for_state(&live, LiveState::Closed).await;
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_clearing_token_closes_token_bound_subscriber() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .respond_with(sse(": connected\n\n"))
            .mount(&server)
            .await;

        let session = Session::with_token("jwt_abc");
        let live = client_with_stream(&server, slow_reconnect())
            .live(&session)
            .require_token(true)
            .spawn(Arc::new(RecordingTarget::default()));

        tokio::time::timeout(Duration::from_secs(5), async {
            while server.received_requests().await.unwrap_or_default().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("stream never requested");
        assert_ne!(live.state(), LiveState::Closed);

        session.clear_token();

        wait_for_state(&live, LiveState::Closed).await;
    }

    #[tokio::test]
    async fn test_shutdown_reaches_closed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .respond_with(sse("data: {}\n\n"))
            .mount(&server)
            .await;

        let live = client_with_stream(&server, slow_reconnect())
            .live(&Session::new())
            .spawn(Arc::new(RecordingTarget::default()));

        let state = live.watch_state();
        live.shutdown().await;

        assert_eq!(*state.borrow(), LiveState::Closed);
    }

    #[tokio::test]
    async fn test_drop_tears_down() {
        let server = MockServer::start().await;

        let live = client_with_stream(&server, slow_reconnect())
            .live(&Session::new())
            .spawn(Arc::new(RecordingTarget::default()));

        let mut state = live.watch_state();
        drop(live);

        tokio::time::timeout(
            Duration::from_secs(5),
            state.wait_for(|s| *s == LiveState::Closed),
        )
        .await
        .expect("subscriber did not close")
        .expect("state channel closed");
    }
}
