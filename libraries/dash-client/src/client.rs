//! Main dashboard API client.

use crate::auth::AuthClient;
use crate::error::{ClientError, Result};
use crate::live::LiveRefreshBuilder;
use crate::products::ProductsClient;
use crate::session::Session;
use crate::types::{ClientConfig, FetchOptions};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client for the dashboard REST API.
///
/// Owns the HTTP connection pools and the validated configuration. Tokens are
/// not stored here: every call takes the [`Session`] it acts for.
///
/// # Example
///
/// ```ignore
/// use dash_client::{ClientConfig, DashClient, Session};
/// use dash_core::Credentials;
///
/// let client = DashClient::new(ClientConfig::new("https://api.example.com"))?;
/// let session = Session::new();
///
/// client.auth().login(&session, &Credentials::new("a@b.com", "secret123")).await?;
/// let products = client.products().list(&session).await?;
/// println!("{} products", products.len());
/// ```
#[derive(Clone)]
pub struct DashClient {
    http: Client,
    // No total timeout: the push channel stays open indefinitely.
    stream_http: Client,
    config: Arc<ClientConfig>,
}

impl DashClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::InvalidUrl(
                "API base URL is not configured (set DASH_API_BASE)".into(),
            ));
        }

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let user_agent = format!("ProductDashboard/{}", env!("CARGO_PKG_VERSION"));

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(user_agent.clone())
            .build()?;

        let stream_http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            http,
            stream_http,
            config: Arc::new(ClientConfig { base_url, ..config }),
        })
    }

    /// Normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Authentication and profile routes.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(self)
    }

    /// Product CRUD routes.
    pub fn products(&self) -> ProductsClient<'_> {
        ProductsClient::new(self)
    }

    /// Start building a live-refresh subscription for `session`.
    pub fn live(&self, session: &Session) -> LiveRefreshBuilder {
        LiveRefreshBuilder::new(self.clone(), session.clone())
    }

    /// Issue a request and deserialize the parsed body into `T`.
    ///
    /// See [`fetch_value`](Self::fetch_value) for the request and error
    /// semantics.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, options: FetchOptions) -> Result<T> {
        let value = self.fetch_value(path, options).await?;
        serde_json::from_value(value).map_err(|e| {
            ClientError::ParseError(format!("Unexpected response from {}: {}", path, e))
        })
    }

    /// Issue a request against `path` (relative to the base URL).
    ///
    /// The body is sent as JSON unless the method is GET or HEAD. The
    /// response body is parsed as JSON; anything unparseable (including an
    /// empty body) becomes `{}`. A non-2xx status fails with
    /// [`ClientError::Api`] carrying the body's `message`, else its `error`,
    /// else `Request failed (<status>)`.
    pub async fn fetch_value(&self, path: &str, options: FetchOptions) -> Result<Value> {
        let method = options.method.unwrap_or(Method::GET);
        let url = format!("{}{}", self.config.base_url, path);

        debug!(method = %method, url = %url, authenticated = options.token.is_some(), "API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }
        if let Some(token) = &options.token {
            request = request.bearer_auth(token);
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if method != Method::GET && method != Method::HEAD {
            if let Some(body) = &options.body {
                request = request.body(body.to_string());
            }
        }

        let response = request.send().await.map_err(ClientError::from_transport)?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(ClientError::from_transport)?;

        let body: Value =
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Object(Default::default()));

        if status.is_success() {
            Ok(body)
        } else {
            let message = error_message(&body, status);
            if status == StatusCode::UNAUTHORIZED {
                warn!(url = %url, message = %message, "Request rejected as unauthorized");
            } else {
                debug!(url = %url, status = %status, message = %message, "Request failed");
            }
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    pub(crate) fn stream_http(&self) -> &Client {
        &self.stream_http
    }

    /// Full URL of the push channel, or `None` when live refresh is disabled.
    pub(crate) fn stream_url(&self, token: Option<&str>) -> Result<Option<url::Url>> {
        let Some(path) = self.config.stream.path.as_deref() else {
            return Ok(None);
        };

        let mut url = url::Url::parse(&format!("{}{}", self.config.base_url, path))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        if self.config.stream.include_token {
            if let Some(token) = token {
                url.query_pairs_mut().append_pair("token", token);
            }
        }

        Ok(Some(url))
    }
}

fn error_message(body: &Value, status: StatusCode) -> String {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    field("message")
        .or_else(|| field("error"))
        .unwrap_or_else(|| format!("Request failed ({})", status))
}
