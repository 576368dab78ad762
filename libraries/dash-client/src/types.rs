//! Types for dashboard API requests and responses.

use dash_core::{Product, User};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API base URL
pub const ENV_API_BASE: &str = "DASH_API_BASE";

/// Environment variable holding the optional API key
pub const ENV_API_KEY: &str = "DASH_API_KEY";

/// Default path of the server-push channel
pub const DEFAULT_STREAM_PATH: &str = "/products/stream";

/// Default wait before reopening a dropped push connection
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Configuration for connecting to the dashboard API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "https://api.example.com")
    pub base_url: String,
    /// Sent as `x-api-key` on every request when set
    pub api_key: Option<String>,
    /// Total timeout for regular requests
    pub timeout: Duration,
    /// Connect timeout for regular requests and the push channel
    pub connect_timeout: Duration,
    /// Server-push channel settings
    pub stream: StreamConfig,
}

impl ClientConfig {
    /// Create a config with just the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            stream: StreamConfig::default(),
        }
    }

    /// Read the base URL and API key from `DASH_API_BASE` / `DASH_API_KEY`.
    ///
    /// A missing base URL yields an empty one, which `DashClient::new`
    /// rejects with `InvalidUrl`.
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_API_BASE).unwrap_or_default();
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.is_empty());
        Self::new(base_url).with_api_key(api_key)
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }
}

/// Settings for the live-refresh push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Path of the SSE endpoint; `None` disables live refresh
    pub path: Option<String>,
    /// Append `?token=` when the session holds a token
    pub include_token: bool,
    /// Wait before reconnecting; the server's `retry:` field overrides it
    pub reconnect_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            path: Some(DEFAULT_STREAM_PATH.to_string()),
            include_token: false,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

// =============================================================================
// Request Options
// =============================================================================

/// Options for a single [`DashClient::fetch`](crate::DashClient::fetch) call.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// HTTP method; GET when unset
    pub method: Option<reqwest::Method>,
    /// Bearer token for the `Authorization` header
    pub token: Option<String>,
    /// JSON body, ignored for GET and HEAD
    pub body: Option<serde_json::Value>,
    /// Extra headers, applied last
    pub headers: Vec<(String, String)>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn method(mut self, method: reqwest::Method) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize>(mut self, body: &B) -> crate::Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| crate::ClientError::ParseError(format!("Failed to encode body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

// =============================================================================
// Response Envelopes
// =============================================================================

/// Every API response is `{message, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// `data` of `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// `data` of `/auth/me` and `/auth/profile`
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub user: User,
}

/// `data` of `GET /products`
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsData {
    pub products: Vec<Product>,
}

/// `data` of `POST /products` and `PUT /products/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct ProductData {
    pub product: Product,
}

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The server returned a token and it is now in the session
    SignedIn,
    /// Account created; the user still has to log in
    LoginRequired,
}
