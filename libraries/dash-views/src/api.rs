//! The slice of the API each page talks to.
//!
//! Pages are generic over these traits so they can be driven by a
//! [`DashClient`] in production and by mocks in tests.

use async_trait::async_trait;
use dash_client::{DashClient, RegisterOutcome, Result, Session};
use dash_core::{
    Credentials, NewProduct, Product, ProductId, ProductUpdate, ProfileUpdate, Registration, User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductsApi: Send + Sync {
    async fn list_products(&self, session: &Session) -> Result<Vec<Product>>;

    async fn create_product(&self, session: &Session, product: &NewProduct) -> Result<Product>;

    async fn update_product(
        &self,
        session: &Session,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product>;

    async fn delete_product(&self, session: &Session, id: ProductId) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn me(&self, session: &Session) -> Result<User>;

    async fn update_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<User>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, session: &Session, credentials: &Credentials) -> Result<()>;

    async fn register(
        &self,
        session: &Session,
        registration: &Registration,
    ) -> Result<RegisterOutcome>;

    async fn logout(&self, session: &Session);
}

#[async_trait]
impl ProductsApi for DashClient {
    async fn list_products(&self, session: &Session) -> Result<Vec<Product>> {
        self.products().list(session).await
    }

    async fn create_product(&self, session: &Session, product: &NewProduct) -> Result<Product> {
        self.products().create(session, product).await
    }

    async fn update_product(
        &self,
        session: &Session,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product> {
        self.products().update(session, id, update).await
    }

    async fn delete_product(&self, session: &Session, id: ProductId) -> Result<()> {
        self.products().delete(session, id).await
    }
}

#[async_trait]
impl ProfileApi for DashClient {
    async fn me(&self, session: &Session) -> Result<User> {
        self.auth().me(session).await
    }

    async fn update_profile(&self, session: &Session, update: &ProfileUpdate) -> Result<User> {
        self.auth().update_profile(session, update).await
    }
}

#[async_trait]
impl AuthApi for DashClient {
    async fn login(&self, session: &Session, credentials: &Credentials) -> Result<()> {
        self.auth().login(session, credentials).await
    }

    async fn register(
        &self,
        session: &Session,
        registration: &Registration,
    ) -> Result<RegisterOutcome> {
        self.auth().register(session, registration).await
    }

    async fn logout(&self, session: &Session) {
        self.auth().logout(session).await;
    }
}
