//! Product Dashboard Core
//!
//! Domain types and client-side validation shared by the dashboard client,
//! its page views and the command-line front end.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Product` and the request bodies sent to the API
//! - **Validation**: form parsing that rejects bad input before any network call
//! - **Error Handling**: `ValidationError` and its `Result` alias
//!
//! # Example
//!
//! ```rust
//! use dash_core::ProductForm;
//!
//! let form = ProductForm::new("Kopi Susu", "20000", "");
//! let product = form.to_new_product().unwrap();
//! assert_eq!(product.price, 20000.0);
//! assert!(product.description.is_none());
//!
//! assert!(ProductForm::new("Kopi Susu", "-1", "").to_new_product().is_err());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;
pub mod validation;

pub use error::{Result, ValidationError};
pub use types::{
    Credentials, NewProduct, Product, ProductId, ProductUpdate, ProfileUpdate, Registration,
    User, UserId,
};
pub use validation::{parse_price, ProductForm, MIN_PASSWORD_LEN, MIN_PRODUCT_NAME_LEN};
