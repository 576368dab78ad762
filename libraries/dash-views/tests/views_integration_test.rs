//! End-to-end tests of the page views against a mock API server.

use dash_client::{ClientConfig, DashClient, Session, StreamConfig};
use dash_core::{Credentials, ProductForm, ProductId};
use dash_views::{AuthView, Notice, ProductsPage, ProfilePage, ViewError};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DashClient {
    let stream = StreamConfig {
        reconnect_delay: Duration::from_secs(60),
        ..StreamConfig::default()
    };
    DashClient::new(ClientConfig::new(server.uri()).with_stream(stream)).unwrap()
}

fn products_body(count: i64) -> Value {
    let products: Vec<Value> = (1..=count)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Product {}", id),
                "price": 1000 * id,
                "description": null,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            })
        })
        .collect();
    json!({"message": "ok", "data": {"products": products}})
}

fn me_body(id: i64, name: &str) -> Value {
    json!({
        "message": "ok",
        "data": {"user": {"id": id, "name": name, "email": "a@b.com"}}
    })
}

async fn eventually<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// =============================================================================
// Session Flow Tests
// =============================================================================

mod session_flow {
    use super::*;

    #[tokio::test]
    async fn test_login_then_logout_leaves_empty_product_list() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login success",
                "data": {"token": "jwt_abc"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "bye"})))
            .mount(&server)
            .await;

        // Authenticated listing first so it wins over the catch-all below.
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(header("Authorization", "Bearer jwt_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_body(3)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = Session::new();
        let auth = AuthView::new(client.clone(), session.clone());
        let products = ProductsPage::new(client.clone(), session.clone());

        auth.login(&Credentials::new("a@b.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(session.token().as_deref(), Some("jwt_abc"));

        products.load().await.unwrap();
        assert_eq!(products.products().await.len(), 3);

        auth.logout().await;
        assert!(!session.is_authenticated());

        products.load().await.unwrap();
        assert!(products.products().await.is_empty());
        assert!(products.notice().await.is_none());
    }

    #[tokio::test]
    async fn test_protected_actions_without_token_never_hit_server() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = Session::new();
        let products = ProductsPage::new(client.clone(), session.clone());
        let profile = ProfilePage::new(client, session);

        let err = products
            .create(&ProductForm::new("Kopi", "20000", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::LoginRequired { .. }));
        assert_eq!(
            products.notice().await,
            Some(Notice::error("You must log in to create products"))
        );

        let err = profile
            .save(&dash_core::ProfileUpdate::new("Ani", "a@b.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::LoginRequired { .. }));

        let err = profile.load().await.unwrap_err();
        assert!(matches!(err, ViewError::TokenNotFound));
    }
}

// =============================================================================
// Products Page Tests
// =============================================================================

mod products_page {
    use super::*;

    #[tokio::test]
    async fn test_bad_price_never_posts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let page = ProductsPage::new(client_for(&server), Session::with_token("jwt_abc"));

        for price in ["dua puluh ribu", "-1"] {
            let err = page
                .create(&ProductForm::new("Kopi", price, ""))
                .await
                .unwrap_err();
            assert!(matches!(err, ViewError::Validation(_)));
        }
        assert_eq!(
            page.notice().await,
            Some(Notice::error("Price must be >= 0"))
        );
    }

    #[tokio::test]
    async fn test_delete_last_item_on_page_two_clamps_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_body(11)))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_body(10)))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/products/11"))
            .and(header("Authorization", "Bearer jwt_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
            .expect(1)
            .mount(&server)
            .await;

        let page = ProductsPage::new(client_for(&server), Session::with_token("jwt_abc"));
        page.load().await.unwrap();
        assert_eq!(page.set_page(2).await, 2);

        page.delete(ProductId::new(11)).await.unwrap();

        let state = page.snapshot().await;
        assert_eq!(state.pagination.page(), 1);
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.visible().len(), 10);
        assert_eq!(state.notice, Some(Notice::success("Product deleted")));
    }

    #[tokio::test]
    async fn test_live_event_reloads_silently() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_body(1)))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_body(2)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                b"event: products_changed\ndata: {\"productId\": 2}\n\n".to_vec(),
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let page = Arc::new(ProductsPage::new(client.clone(), Session::new()));
        page.load().await.unwrap();
        assert_eq!(page.products().await.len(), 1);

        let live = page.live(&client);
        eventually(|| {
            let page = Arc::clone(&page);
            async move { page.products().await.len() == 2 }
        })
        .await;

        assert!(page.notice().await.is_none());
        live.shutdown().await;
    }
}

// =============================================================================
// Profile Page Tests
// =============================================================================

mod profile_page {
    use super::*;

    #[tokio::test]
    async fn test_only_own_profile_events_trigger_reload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("Authorization", "Bearer jwt_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body(1, "Ani")))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body(1, "Ani Baru")))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                b"event: profile_changed\ndata: {\"userId\": 2}\n\n\
                  event: profile_changed\ndata: not-json\n\n\
                  event: profile_changed\ndata: {\"userId\": 1}\n\n"
                    .to_vec(),
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let page = Arc::new(ProfilePage::new(client.clone(), Session::with_token("jwt_abc")));
        page.load().await.unwrap();

        let live = page.live(&client);
        eventually(|| {
            let page = Arc::clone(&page);
            async move { page.notice().await == Some(Notice::info("Profile updated (live)")) }
        })
        .await;

        assert_eq!(page.user().await.unwrap().name, "Ani Baru");
        live.shutdown().await;
    }

    #[tokio::test]
    async fn test_save_profile_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/auth/profile"))
            .and(header("Authorization", "Bearer jwt_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body(1, "Ani B")))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(me_body(1, "Ani B")))
            .mount(&server)
            .await;

        let page = ProfilePage::new(client_for(&server), Session::with_token("jwt_abc"));
        page.save(&dash_core::ProfileUpdate::new("Ani B", "a@b.com"))
            .await
            .unwrap();

        assert_eq!(page.user().await.unwrap().name, "Ani B");
        assert_eq!(page.notice().await, Some(Notice::success("Profile saved")));
    }
}
