//! Product Dashboard Client
//!
//! HTTP client library for the Product Dashboard API.
//!
//! # Features
//!
//! - **Requests**: JSON in and out, bearer token and API key headers, error
//!   bodies normalized into [`ClientError::Api`]
//! - **Session**: an explicit token holder shared by every view, with change
//!   notifications
//! - **Auth & profile**: login, registration, current user, profile update, logout
//! - **Products**: list, create, update, delete
//! - **Live refresh**: SSE subscription that silently re-fetches on relevant events
//!
//! # Example
//!
//! ```ignore
//! use dash_client::{ClientConfig, DashClient, Session};
//! use dash_core::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DashClient::new(ClientConfig::from_env())?;
//!     let session = Session::new();
//!
//!     client
//!         .auth()
//!         .login(&session, &Credentials::new("a@b.com", "secret123"))
//!         .await?;
//!
//!     let me = client.auth().me(&session).await?;
//!     println!("Logged in as {}", me.name);
//!
//!     let products = client.products().list(&session).await?;
//!     println!("Found {} products", products.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
pub mod live;
mod products;
mod session;
mod types;

// Re-export main types
pub use client::DashClient;
pub use error::{ClientError, Result};
pub use session::Session;
pub use types::{
    ApiEnvelope, ClientConfig, FetchOptions, ProductData, ProductsData, RegisterOutcome,
    StreamConfig, TokenData, UserData, DEFAULT_RECONNECT_DELAY, DEFAULT_STREAM_PATH, ENV_API_BASE,
    ENV_API_KEY,
};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use live::{EventKind, LiveEvent, LiveRefresh, LiveState, RefreshTarget};
pub use products::ProductsClient;
