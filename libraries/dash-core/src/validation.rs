//! Client-side form validation.
//!
//! Forms hold raw text the way the user typed it. Converting a form into a
//! request body either yields a value that is safe to send or a
//! [`ValidationError`], and nothing reaches the network in the error case.

use crate::error::{Result, ValidationError};
use crate::types::{NewProduct, Product, ProductUpdate};

/// Minimum length of a trimmed product name
pub const MIN_PRODUCT_NAME_LEN: usize = 2;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Parse a user-typed price.
///
/// Blank, non-numeric, infinite and NaN inputs are rejected, as is anything
/// below zero.
pub fn parse_price(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::PriceNotNumeric);
    }
    let price: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::PriceNotNumeric)?;
    if !price.is_finite() {
        return Err(ValidationError::PriceNotNumeric);
    }
    if price < 0.0 {
        return Err(ValidationError::NegativePrice);
    }
    Ok(price)
}

/// Raw contents of the create/edit product form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
}

impl ProductForm {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            description: description.into(),
        }
    }

    /// Pre-fill an edit form from a listed product
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: format_plain_price(product.price),
            description: product.description.clone().unwrap_or_default(),
        }
    }

    /// Whether the submit button would be enabled
    pub fn is_submittable(&self) -> bool {
        self.validated().is_ok()
    }

    pub fn to_new_product(&self) -> Result<NewProduct> {
        let (name, price, description) = self.validated()?;
        Ok(NewProduct {
            name,
            price,
            description,
        })
    }

    pub fn to_update(&self) -> Result<ProductUpdate> {
        let (name, price, description) = self.validated()?;
        Ok(ProductUpdate {
            name,
            price,
            description,
        })
    }

    fn validated(&self) -> Result<(String, f64, Option<String>)> {
        let name = self.name.trim();
        if name.chars().count() < MIN_PRODUCT_NAME_LEN {
            return Err(ValidationError::NameTooShort {
                min: MIN_PRODUCT_NAME_LEN,
            });
        }
        let price = parse_price(&self.price)?;
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Ok((name.to_string(), price, description))
    }
}

// 20000.0 -> "20000", 12.5 -> "12.5"
fn format_plain_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        price.to_string()
    }
}
