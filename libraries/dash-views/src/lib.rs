//! Product Dashboard Views
//!
//! Headless page logic for the Product Dashboard: what each page holds,
//! which requests it makes, and which notice it shows afterwards. Rendering
//! is left to the caller (the `dash` CLI, or any other front end).
//!
//! # Pages
//!
//! - [`ProductsPage`]: product list with client-side pagination and
//!   create/update/delete, kept fresh by `products_changed` events
//! - [`ProfilePage`]: the signed-in user, editable, kept fresh by
//!   `profile_changed` events for that user only
//! - [`AuthView`]: login, registration and logout
//!
//! All pages share one [`dash_client::Session`]. Protected actions check it
//! before any request is made, and validation failures never reach the
//! network.
//!
//! # Example
//!
//! ```ignore
//! use dash_client::{ClientConfig, DashClient, Session};
//! use dash_views::ProductsPage;
//! use std::sync::Arc;
//!
//! let client = DashClient::new(ClientConfig::from_env())?;
//! let page = Arc::new(ProductsPage::new(client.clone(), Session::new()));
//!
//! page.load().await?;
//! let _live = page.live(&client);
//! for product in page.visible().await {
//!     println!("{} {}", product.name, dash_views::format_price(product.price));
//! }
//! ```

mod api;
mod auth;
mod error;
mod format;
mod notice;
mod pagination;
mod products;
mod profile;
mod sequence;

pub use api::{AuthApi, ProductsApi, ProfileApi};
pub use auth::{AuthState, AuthView};
pub use error::{Result, ViewError};
pub use format::{format_number, format_price};
pub use notice::{Notice, NoticeKind};
pub use pagination::{Pagination, DEFAULT_PER_PAGE};
pub use products::{ProductsPage, ProductsState};
pub use profile::{ProfilePage, ProfileState};
pub use sequence::{RequestSequence, Ticket};
