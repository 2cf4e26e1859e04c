use std::{cell::RefCell, rc::Rc};

use futures::future::join_all;
use tracing::{debug, warn};

use super::{
    transaction::{FavouriteOp, Transaction},
    FavouriteSet, LikeCounts,
};
use crate::{api::CatalogApi, catalog::ProductId, lifetime::Lifetime, session::UserId};

/// What happens to the local favourite state when the server rejects a
/// toggle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TogglePolicy {
    /// Restore the state the product had before the toggle.
    #[default]
    Rollback,
    /// Keep the toggled state even though the server never recorded it. The
    /// two stay out of step until the favourites are loaded again.
    Optimistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server recorded the product as a favourite.
    Favourited,
    /// The server removed the product from the favourites.
    Unfavourited,
    /// The server request failed; the local state follows the toggle policy.
    Failed,
    /// A change to the same product was still in flight, so nothing was sent.
    Ignored,
    /// The owning view went away before the toggle finished.
    Abandoned,
}

#[derive(Debug, Default)]
struct SyncState {
    favourites: FavouriteSet,
    like_counts: LikeCounts,
    loading: bool,
}

/// Keeps a user's favourites and the like counts of a set of products in step
/// with the server. The server's counts are always taken as-is; local changes
/// never adjust a count arithmetically.
pub struct FavouritesSync<A: CatalogApi> {
    api: Rc<A>,
    user: UserId,
    policy: TogglePolicy,
    lifetime: Lifetime,
    state: RefCell<SyncState>,
}

impl<A: CatalogApi> FavouritesSync<A> {
    pub fn new(api: Rc<A>, user: UserId, lifetime: Lifetime) -> Self {
        Self {
            api,
            user,
            policy: TogglePolicy::default(),
            lifetime,
            state: RefCell::new(SyncState::default()),
        }
    }

    pub fn with_policy(mut self, policy: TogglePolicy) -> Self {
        self.set_policy(policy);
        self
    }

    pub fn set_policy(&mut self, policy: TogglePolicy) {
        self.policy = policy;
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn is_favourite(&self, product: &ProductId) -> bool {
        self.state.borrow().favourites.contains(product)
    }

    /// The like count to display. Products whose count is unknown show zero.
    pub fn like_count(&self, product: &ProductId) -> u64 {
        self.known_count(product).unwrap_or(0)
    }

    pub fn known_count(&self, product: &ProductId) -> Option<u64> {
        self.state.borrow().like_counts.get(product).copied()
    }

    pub fn favourites(&self) -> FavouriteSet {
        self.state.borrow().favourites.clone()
    }

    /// Whether the favourites are still being downloaded.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Replaces the local favourites with the server's. If the download
    /// fails the user is treated as having no favourites. Products with a
    /// toggle still in flight keep their pending state either way.
    pub async fn load_favourites(&self) {
        self.state.borrow_mut().loading = true;
        let result = self.lifetime.guard(self.api.fetch_favourites(&self.user)).await;
        let mut state = self.state.borrow_mut();
        state.loading = false;
        match result {
            None => {}
            Some(Ok(ids)) => {
                debug!(user = %self.user, count = ids.len(), "loaded favourites");
                state.favourites.reload(ids);
            }
            Some(Err(err)) => {
                warn!(user = %self.user, "unable to fetch favourites: {err}");
                state.favourites.reload(Vec::<ProductId>::new());
            }
        }
    }

    /// Downloads the like count of every given product at once and replaces
    /// the local counts with the results. Products whose count could not be
    /// fetched are left without one. Returns false if the lifetime ended
    /// first, in which case nothing was written.
    pub async fn load_counts(&self, products: &[ProductId]) -> bool {
        let requests = products
            .iter()
            .map(|product| async move { (product, self.api.fetch_like_count(product).await) });
        let Some(results) = self.lifetime.guard(join_all(requests)).await else {
            return false;
        };

        let mut counts = LikeCounts::with_capacity(results.len());
        for (product, result) in results {
            match result {
                Ok(count) => {
                    counts.insert(product.clone(), count);
                }
                Err(err) => warn!(product_id = %product, "unable to fetch like count: {err}"),
            }
        }
        self.state.borrow_mut().like_counts = counts;
        true
    }

    /// Downloads the like count of one product, keeping the previous count if
    /// the download fails.
    pub async fn refresh_count(&self, product: &ProductId) {
        match self.lifetime.guard(self.api.fetch_like_count(product)).await {
            None => {}
            Some(Ok(count)) => {
                self.state.borrow_mut().like_counts.insert(product.clone(), count);
            }
            Some(Err(err)) => warn!(product_id = %product, "unable to refresh like count: {err}"),
        }
    }

    /// Adds the product to the favourites if it is not one, and removes it
    /// otherwise. The change is shown locally right away. Whatever the server
    /// answers, the product's like count is fetched again afterwards.
    pub async fn toggle(&self, product: &ProductId) -> ToggleOutcome {
        if !self.lifetime.is_active() {
            return ToggleOutcome::Abandoned;
        }

        let (op, rollback) = {
            let mut state = self.state.borrow_mut();
            let op = FavouriteOp::toggle(&state.favourites, product);
            match op.execute(&mut state.favourites) {
                Ok(rollback) => (op, rollback),
                Err(err) => {
                    debug!(product_id = %product, "ignoring toggle: {err}");
                    return ToggleOutcome::Ignored;
                }
            }
        };

        let request = async {
            match &op {
                FavouriteOp::Add(_) => self.api.add_favourite(&self.user, product).await,
                FavouriteOp::Remove(_) => self.api.remove_favourite(&self.user, product).await,
            }
        };
        let Some(result) = self.lifetime.guard(request).await else {
            return ToggleOutcome::Abandoned;
        };

        let outcome = {
            let mut state = self.state.borrow_mut();
            match result {
                Ok(()) => {
                    state.favourites.set_state(product.clone(), op.confirmed());
                    match op {
                        FavouriteOp::Add(_) => ToggleOutcome::Favourited,
                        FavouriteOp::Remove(_) => ToggleOutcome::Unfavourited,
                    }
                }
                Err(err) => {
                    warn!(product_id = %product, policy = ?self.policy, "unable to update favourites: {err}");
                    match self.policy {
                        TogglePolicy::Rollback => rollback(&mut state.favourites),
                        TogglePolicy::Optimistic => {
                            state.favourites.set_state(product.clone(), op.confirmed())
                        }
                    }
                    ToggleOutcome::Failed
                }
            }
        };

        self.refresh_count(product).await;
        outcome
    }
}
