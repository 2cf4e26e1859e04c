use std::collections::HashMap;

use crate::catalog::ProductId;

pub mod client;
pub mod transaction;

pub use client::{FavouritesSync, ToggleOutcome, TogglePolicy};
pub use transaction::{FavouriteOp, Rollback, Transaction, TransactionError};

/// Where a single product stands with respect to the user's favourites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// The local state matches what the server last confirmed.
    Synced(bool),
    /// An addition has been sent and not yet confirmed.
    PendingAdd,
    /// A removal has been sent and not yet confirmed.
    PendingRemove,
}

impl ItemState {
    /// Whether the product should be shown as favourited. Pending changes are
    /// shown as if they had already succeeded.
    pub fn is_favourite(self) -> bool {
        matches!(self, Self::Synced(true) | Self::PendingAdd)
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::PendingAdd | Self::PendingRemove)
    }
}

/// The products one user has favourited, as this client currently sees them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FavouriteSet {
    items: HashMap<ProductId, ItemState>,
}

impl FavouriteSet {
    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        Self { items: ids.into_iter().map(|id| (id, ItemState::Synced(true))).collect() }
    }

    pub fn state(&self, product: &ProductId) -> ItemState {
        self.items.get(product).copied().unwrap_or(ItemState::Synced(false))
    }

    pub fn contains(&self, product: &ProductId) -> bool {
        self.state(product).is_favourite()
    }

    /// The favourited ids, sorted so callers get a stable order.
    pub fn ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<_> = self
            .items
            .iter()
            .filter(|(_, state)| state.is_favourite())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.items.values().filter(|state| state.is_favourite()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn set_state(&mut self, product: ProductId, state: ItemState) {
        if state == ItemState::Synced(false) {
            self.items.remove(&product);
        } else {
            self.items.insert(product, state);
        }
    }

    /// Replaces every synced item with the server's favourites `ids`. Items
    /// with a change in flight keep their pending state; the toggle that
    /// sent the change settles them.
    pub(crate) fn reload(&mut self, ids: impl IntoIterator<Item = ProductId>) {
        self.items.retain(|_, state| state.is_pending());
        for id in ids {
            self.items.entry(id).or_insert(ItemState::Synced(true));
        }
    }
}

/// The like count of each product, as last reported by the server.
pub type LikeCounts = HashMap<ProductId, u64>;
