//! Client side of a classifieds marketplace catalog.
//!
//! A [`ProductListView`](view::ProductListView) lists the products of one
//! [`CategorySchema`](catalog::CategorySchema), together with the like count
//! of each product and whether the signed-in user has favourited it. The
//! favourites themselves are kept in step with the server by
//! [`FavouritesSync`](sync::FavouritesSync). All network access goes
//! through the [`CatalogApi`](api::CatalogApi) trait.
//!
//! Everything here is meant to run on a single thread: views keep their
//! state in `RefCell`s and the futures they return are not `Send`.

pub mod api;
pub mod catalog;
pub mod config;
pub mod lifetime;
pub mod render;
pub mod session;
pub mod sync;
pub mod view;

pub use api::{ApiError, CatalogApi, HttpCatalogApi};
pub use catalog::{CategorySchema, Product, ProductId};
pub use config::{Config, ConfigError};
pub use session::{SessionStore, UserId};
pub use sync::{FavouritesSync, ToggleOutcome, TogglePolicy};
pub use view::{ListingMode, ProductListView};
