//! Product CRUD routes.

use crate::client::DashClient;
use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::types::{ApiEnvelope, FetchOptions, ProductData, ProductsData};
use dash_core::{NewProduct, Product, ProductId, ProductUpdate};
use reqwest::Method;
use tracing::debug;

/// Products client for the dashboard API.
pub struct ProductsClient<'a> {
    client: &'a DashClient,
}

impl<'a> ProductsClient<'a> {
    pub(crate) fn new(client: &'a DashClient) -> Self {
        Self { client }
    }

    /// List all products.
    ///
    /// The route is public; the token is attached when the session has one.
    pub async fn list(&self, session: &Session) -> Result<Vec<Product>> {
        let response: ApiEnvelope<ProductsData> = self
            .client
            .fetch("/products", FetchOptions::new().token(session.token()))
            .await?;

        debug!(count = response.data.products.len(), "Fetched products");
        Ok(response.data.products)
    }

    pub async fn create(&self, session: &Session, product: &NewProduct) -> Result<Product> {
        let token = session.token().ok_or(ClientError::AuthRequired)?;

        let response: ApiEnvelope<ProductData> = self
            .client
            .fetch(
                "/products",
                FetchOptions::new()
                    .method(Method::POST)
                    .token(Some(token))
                    .json(product)?,
            )
            .await?;

        debug!(product_id = %response.data.product.id, "Product created");
        Ok(response.data.product)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product> {
        let token = session.token().ok_or(ClientError::AuthRequired)?;

        let response: ApiEnvelope<ProductData> = self
            .client
            .fetch(
                &format!("/products/{}", id),
                FetchOptions::new()
                    .method(Method::PUT)
                    .token(Some(token))
                    .json(update)?,
            )
            .await?;

        debug!(product_id = %id, "Product updated");
        Ok(response.data.product)
    }

    pub async fn delete(&self, session: &Session, id: ProductId) -> Result<()> {
        let token = session.token().ok_or(ClientError::AuthRequired)?;

        self.client
            .fetch_value(
                &format!("/products/{}", id),
                FetchOptions::new().method(Method::DELETE).token(Some(token)),
            )
            .await?;

        debug!(product_id = %id, "Product deleted");
        Ok(())
    }
}
