use thiserror::Error;

use super::{FavouriteSet, ItemState};
use crate::catalog::ProductId;

/// A local change to some `V` that the server has not confirmed yet.
pub trait Transaction<V> {
    /// Applies the change to `value` and returns the closure that undoes it.
    /// Applied to a [`FavouriteSet`], the rollback puts the product back into
    /// the state it had before, so a rejected toggle leaves no trace. On error
    /// `value` is untouched.
    fn execute(&self, value: &mut V) -> Result<Rollback<V>, TransactionError>;
}

pub type Rollback<V> = Box<dyn Fn(&mut V)>;

/// Error type for executing transactions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("product {0} already has a favourite request in flight")]
    Pending(ProductId),
    #[error("product {0} is already in the requested favourite state")]
    AlreadyApplied(ProductId),
}

/// An optimistic change to the local favourite set, made before the server
/// has confirmed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavouriteOp {
    Add(ProductId),
    Remove(ProductId),
}

impl FavouriteOp {
    /// The operation that flips the current favourite state of `product`.
    pub fn toggle(set: &FavouriteSet, product: &ProductId) -> Self {
        if set.contains(product) {
            Self::Remove(product.clone())
        } else {
            Self::Add(product.clone())
        }
    }

    /// The state the product is in once the server has accepted the change.
    pub fn confirmed(&self) -> ItemState {
        ItemState::Synced(matches!(self, Self::Add(_)))
    }

    pub fn product(&self) -> &ProductId {
        match self {
            Self::Add(product) | Self::Remove(product) => product,
        }
    }
}

impl Transaction<FavouriteSet> for FavouriteOp {
    fn execute(&self, set: &mut FavouriteSet) -> Result<Rollback<FavouriteSet>, TransactionError> {
        let product = self.product().clone();
        let prior = set.state(&product);
        let pending = match (self, prior) {
            (_, ItemState::PendingAdd | ItemState::PendingRemove) => {
                return Err(TransactionError::Pending(product));
            }
            (Self::Add(_), ItemState::Synced(false)) => ItemState::PendingAdd,
            (Self::Remove(_), ItemState::Synced(true)) => ItemState::PendingRemove,
            (_, ItemState::Synced(_)) => return Err(TransactionError::AlreadyApplied(product)),
        };
        set.set_state(product.clone(), pending);
        Ok(Box::new(move |set| set.set_state(product.clone(), prior)))
    }
}
