use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiError, CatalogApi};
use crate::{
    catalog::{CategorySchema, Product, ProductId},
    session::UserId,
};

/// Talks to the marketplace server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base: Url,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FavouriteRequest<'a> {
    user_id: &'a UserId,
    product_id: &'a ProductId,
}

impl HttpCatalogApi {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport { url: base.to_string(), source })?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.to_string(), source })?;
        let response = check_status(&url, response)?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Decode { url: url.to_string(), message: err.to_string() })
    }
}

fn check_status(url: &Url, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status { url: url.to_string(), status: status.as_u16() })
    }
}

impl CatalogApi for HttpCatalogApi {
    async fn fetch_products(&self, category: &CategorySchema) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint(category.endpoint_segments());
        let entries: Vec<Value> = self.get_json(url).await?;
        let products = entries
            .into_iter()
            .filter_map(|entry| match Product::from_value(entry, &category.id_field) {
                Ok(product) => Some(product),
                Err(err) => {
                    warn!(category = %category.key, "skipping listing entry: {err}");
                    None
                }
            })
            .collect();
        Ok(products)
    }

    async fn fetch_like_count(&self, product: &ProductId) -> Result<u64, ApiError> {
        let url = self.endpoint(["favourites", "count", product.as_str()]);
        let response: CountResponse = self.get_json(url).await?;
        Ok(response.count)
    }

    async fn fetch_favourites(&self, user: &UserId) -> Result<Vec<ProductId>, ApiError> {
        let url = self.endpoint(["favourites", "all", user.path_segment()]);
        self.get_json(url).await
    }

    async fn add_favourite(&self, user: &UserId, product: &ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(["favourites", "add"]);
        debug!(url = %url, product_id = %product, "POST");
        let response = self
            .client
            .post(url.clone())
            .json(&FavouriteRequest { user_id: user, product_id: product })
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.to_string(), source })?;
        check_status(&url, response).map(|_| ())
    }

    async fn remove_favourite(&self, user: &UserId, product: &ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(["favourites", "remove"]);
        debug!(url = %url, product_id = %product, "DELETE");
        let response = self
            .client
            .delete(url.clone())
            .json(&FavouriteRequest { user_id: user, product_id: product })
            .send()
            .await
            .map_err(|source| ApiError::Transport { url: url.to_string(), source })?;
        check_status(&url, response).map(|_| ())
    }

    fn asset_url(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
