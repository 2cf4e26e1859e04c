use std::{cell::RefCell, rc::Rc};

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn, Instrument};

use crate::{
    api::CatalogApi,
    catalog::{CategorySchema, Product, ProductId},
    lifetime::{Lifetime, MountId},
    render::{Card, RenderedView},
    session::UserId,
    sync::{FavouritesSync, ToggleOutcome, TogglePolicy},
};

/// Whether a view shows a short preview of its category or all of it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Shows at most the category's preview limit, with a route to the rest.
    Preview,
    #[default]
    Full,
}

#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(CatalogPage),
    Error(String),
}

/// Lists the products of one category along with the user's favourites and
/// the like count of every product.
pub struct ProductListView<A: CatalogApi> {
    category: CategorySchema,
    mode: ListingMode,
    api: Rc<A>,
    lifetime: Lifetime,
    favourites: FavouritesSync<A>,
    state: RefCell<LoadState>,
}

impl<A: CatalogApi> ProductListView<A> {
    pub fn new(api: Rc<A>, category: CategorySchema, user: UserId, mode: ListingMode) -> Self {
        let lifetime = Lifetime::new();
        Self {
            favourites: FavouritesSync::new(api.clone(), user, lifetime.clone()),
            category,
            mode,
            api,
            lifetime,
            state: RefCell::new(LoadState::Loading),
        }
    }

    pub fn with_policy(mut self, policy: TogglePolicy) -> Self {
        self.favourites.set_policy(policy);
        self
    }

    pub fn category(&self) -> &CategorySchema {
        &self.category
    }

    pub fn mount(&self) -> MountId {
        self.lifetime.mount()
    }

    pub fn favourites(&self) -> &FavouritesSync<A> {
        &self.favourites
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lifetime.is_active()
    }

    pub fn favourites_loading(&self) -> bool {
        self.favourites.is_loading()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        match &*self.state.borrow() {
            LoadState::Ready(page) => Some(page.loaded_at),
            _ => None,
        }
    }

    fn limit(&self) -> Option<usize> {
        match self.mode {
            ListingMode::Preview => self.category.preview_limit,
            ListingMode::Full => None,
        }
    }

    /// Loads the products, their like counts and the user's favourites. Only
    /// a failure to load the products puts the view into its error state.
    pub async fn activate(&self) {
        let span = info_span!("product_list", category = %self.category.key, mount = %self.mount());
        async {
            info!("activating");
            tokio::join!(self.load_products(), self.favourites.load_favourites());
        }
        .instrument(span)
        .await
    }

    async fn load_products(&self) {
        let Some(result) = self.lifetime.guard(self.api.fetch_products(&self.category)).await else {
            return;
        };
        let products = match result {
            Ok(products) => products,
            Err(err) => {
                warn!("unable to fetch products: {err}");
                *self.state.borrow_mut() = LoadState::Error(err.to_string());
                return;
            }
        };

        let ids: Vec<ProductId> = products.iter().map(|product| product.id().clone()).collect();
        if !self.favourites.load_counts(&ids).await {
            return;
        }
        info!(count = products.len(), "products loaded");
        *self.state.borrow_mut() = LoadState::Ready(CatalogPage { products, loaded_at: Utc::now() });
    }

    /// Ends the view's lifetime. Requests still in flight are abandoned and
    /// nothing they return is written into the view.
    pub fn deactivate(&self) {
        if self.lifetime.is_active() {
            info!(category = %self.category.key, mount = %self.mount(), "deactivating");
            self.lifetime.end();
        }
    }

    pub async fn toggle_favourite(&self, product: &ProductId) -> ToggleOutcome {
        let span = info_span!("toggle", category = %self.category.key, mount = %self.mount(), product_id = %product);
        self.favourites.toggle(product).instrument(span).await
    }

    pub fn render(&self) -> RenderedView {
        match &*self.state.borrow() {
            LoadState::Loading => RenderedView::Loading,
            LoadState::Error(message) => RenderedView::Error(message.clone()),
            LoadState::Ready(page) => {
                let shown = self.limit().unwrap_or(page.products.len());
                let cards = page
                    .products
                    .iter()
                    .take(shown)
                    .map(|product| {
                        Card::build(
                            &self.category,
                            product,
                            self.favourites.is_favourite(product.id()),
                            self.favourites.like_count(product.id()),
                            |path| self.api.asset_url(path),
                        )
                    })
                    .collect();
                let see_all_route = match self.mode {
                    ListingMode::Preview => self.category.see_all_route.clone(),
                    ListingMode::Full => None,
                };
                RenderedView::Ready { title: self.category.title.clone(), see_all_route, cards }
            }
        }
    }
}

impl<A: CatalogApi> Drop for ProductListView<A> {
    fn drop(&mut self) {
        self.lifetime.end();
    }
}
