//! Products page: the shared product list with pagination and CRUD actions.

use crate::api::ProductsApi;
use crate::error::{Result, ViewError};
use crate::notice::{clear_error, Notice};
use crate::pagination::Pagination;
use crate::sequence::RequestSequence;
use async_trait::async_trait;
use dash_client::{DashClient, EventKind, LiveEvent, LiveRefresh, RefreshTarget, Session};
use dash_core::{Product, ProductForm, ProductId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Everything the products page renders.
#[derive(Debug, Clone, Default)]
pub struct ProductsState {
    pub products: Vec<Product>,
    pub loading: bool,
    /// A create/update/delete is in flight
    pub busy: bool,
    pub notice: Option<Notice>,
    pub pagination: Pagination,
}

impl ProductsState {
    /// Products on the current page.
    pub fn visible(&self) -> &[Product] {
        self.pagination.slice(&self.products)
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.products.len())
    }
}

/// Headless products page.
///
/// Share it behind an [`Arc`]: the live-refresh subscriber holds one
/// reference and the caller another. At most one create/update/delete runs
/// at a time; loads may overlap and are ordered by a [`RequestSequence`].
pub struct ProductsPage<A> {
    api: A,
    session: Session,
    state: RwLock<ProductsState>,
    sequence: RequestSequence,
    /// Visible loads still in flight; `loading` stays set until the last one ends
    visible_loads: AtomicUsize,
}

impl<A: ProductsApi> ProductsPage<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(ProductsState::default()),
            sequence: RequestSequence::new(),
            visible_loads: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.state.get_mut().pagination = Pagination::new(per_page);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Copy of the current state for rendering.
    pub async fn snapshot(&self) -> ProductsState {
        self.state.read().await.clone()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    pub async fn visible(&self) -> Vec<Product> {
        self.state.read().await.visible().to_vec()
    }

    pub async fn notice(&self) -> Option<Notice> {
        self.state.read().await.notice.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn is_busy(&self) -> bool {
        self.state.read().await.busy
    }

    pub async fn page(&self) -> usize {
        self.state.read().await.pagination.page()
    }

    pub async fn total_pages(&self) -> usize {
        self.state.read().await.total_pages()
    }

    /// Jump to a page; out-of-range values are clamped.
    pub async fn set_page(&self, page: usize) -> usize {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.pagination.set_page(page, state.products.len())
    }

    pub async fn next_page(&self) -> bool {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.pagination.next(state.products.len())
    }

    pub async fn prev_page(&self) -> bool {
        self.state.write().await.pagination.prev()
    }

    /// Visible load: shows the loading flag and reports failures as an
    /// error notice.
    pub async fn load(&self) -> Result<()> {
        self.fetch(true).await.map(|_| ()).map_err(ViewError::from)
    }

    /// Background re-fetch: no loading flag, failures leave the page as is.
    pub async fn silent_refresh(&self) -> dash_client::Result<()> {
        self.fetch(false).await.map(|_| ())
    }

    pub async fn create(&self, form: &ProductForm) -> Result<Product> {
        let product = self
            .begin_action("create products", || form.to_new_product())
            .await?;
        let result = self.api.create_product(&self.session, &product).await;
        self.finish_action(result, "Product created").await
    }

    pub async fn update(&self, id: ProductId, form: &ProductForm) -> Result<Product> {
        let update = self
            .begin_action("update products", || form.to_update())
            .await?;
        let result = self.api.update_product(&self.session, id, &update).await;
        self.finish_action(result, "Product updated").await
    }

    pub async fn delete(&self, id: ProductId) -> Result<()> {
        self.begin_action("delete products", || Ok(())).await?;
        let result = self.api.delete_product(&self.session, id).await;
        self.finish_action(result, "Product deleted").await
    }

    /// Fetch the list and apply it unless a newer response got there first.
    /// Returns whether this response was applied.
    async fn fetch(&self, visible: bool) -> dash_client::Result<bool> {
        let ticket = self.sequence.begin();
        if visible {
            let mut state = self.state.write().await;
            self.visible_loads.fetch_add(1, Ordering::SeqCst);
            state.loading = true;
            clear_error(&mut state.notice);
        }

        let result = self.api.list_products(&self.session).await;

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if visible && self.visible_loads.fetch_sub(1, Ordering::SeqCst) == 1 {
            state.loading = false;
        }

        let products = match result {
            Ok(products) => products,
            Err(e) if e.is_unauthorized() && !self.session.is_authenticated() => {
                debug!("Product list needs a login; showing an empty list");
                Vec::new()
            }
            Err(e) => {
                if self.sequence.is_superseded(ticket) {
                    debug!(
                        ticket = ticket.get(),
                        error = %e,
                        "Ignoring failure of a superseded product load"
                    );
                } else if visible {
                    state.notice = Some(Notice::error(e.to_string()));
                }
                return Err(e);
            }
        };

        if !self.sequence.try_apply(ticket) {
            debug!(ticket = ticket.get(), "Discarding stale product list");
            return Ok(false);
        }

        state.products = products;
        state.pagination.clamp(state.products.len());
        debug!(
            count = state.products.len(),
            page = state.pagination.page(),
            "Products loaded"
        );
        Ok(true)
    }

    /// Checks shared by every mutation, in order: not busy, logged in, valid
    /// input. Marks the page busy on success.
    async fn begin_action<T>(
        &self,
        action: &'static str,
        build: impl FnOnce() -> dash_core::Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        if state.busy {
            debug!(action, "Rejected while another request is in flight");
            return Err(ViewError::Busy);
        }
        state.notice = None;

        if !self.session.is_authenticated() {
            let err = ViewError::LoginRequired { action };
            state.notice = Some(Notice::error(err.to_string()));
            return Err(err);
        }

        match build() {
            Ok(input) => {
                state.busy = true;
                Ok(input)
            }
            Err(e) => {
                state.notice = Some(Notice::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    async fn finish_action<T>(
        &self,
        result: dash_client::Result<T>,
        success: &'static str,
    ) -> Result<T> {
        match result {
            Ok(value) => {
                self.state.write().await.notice = Some(Notice::success(success));
                info!("{}", success);

                if let Err(e) = self.fetch(true).await {
                    debug!(error = %e, "Reload after change failed");
                }
                self.state.write().await.busy = false;
                Ok(value)
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.notice = Some(Notice::error(e.to_string()));
                state.busy = false;
                Err(e.into())
            }
        }
    }
}

impl<A: ProductsApi + 'static> ProductsPage<A> {
    /// Keep the page in sync with `products_changed` events until the
    /// returned handle is dropped.
    pub fn live(self: &Arc<Self>, client: &DashClient) -> LiveRefresh {
        client.live(&self.session).spawn(Arc::clone(self))
    }
}

#[async_trait]
impl<A: ProductsApi> RefreshTarget for ProductsPage<A> {
    async fn is_relevant(&self, event: &LiveEvent) -> bool {
        event.kind == EventKind::ProductsChanged
    }

    async fn silent_refresh(&self) -> dash_client::Result<()> {
        self.fetch(false).await.map(|_| ())
    }
}
