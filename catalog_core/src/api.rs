use thiserror::Error;

use crate::{
    catalog::{CategorySchema, Product, ProductId},
    session::UserId,
};

#[cfg(test)]
pub(crate) mod fake;
pub mod http;

pub use http::HttpCatalogApi;

/// Defines the requests the catalog makes to the marketplace server.
pub trait CatalogApi {
    /// Downloads every product listed under the category's endpoint.
    async fn fetch_products(&self, category: &CategorySchema) -> Result<Vec<Product>, ApiError>;

    /// Downloads the number of users that have favourited the product.
    async fn fetch_like_count(&self, product: &ProductId) -> Result<u64, ApiError>;

    /// Downloads the ids of every product the user has favourited.
    async fn fetch_favourites(&self, user: &UserId) -> Result<Vec<ProductId>, ApiError>;

    async fn add_favourite(&self, user: &UserId, product: &ProductId) -> Result<(), ApiError>;

    async fn remove_favourite(&self, user: &UserId, product: &ProductId) -> Result<(), ApiError>;

    /// Resolves an image path from a product listing into a displayable URL.
    fn asset_url(&self, path: &str) -> String;
}

/// A failed request. Failures are not classified any further than this;
/// callers treat every variant the same way.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("unreadable response from {url}: {message}")]
    Decode { url: String, message: String },
}
