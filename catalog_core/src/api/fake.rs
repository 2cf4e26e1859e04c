use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use serde_json::Value;

use super::{ApiError, CatalogApi};
use crate::{
    catalog::{CategorySchema, Product, ProductId},
    session::UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Products,
    Count,
    Favourites,
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Products(String),
    Count(ProductId),
    Favourites(UserId),
    Add(UserId, ProductId),
    Remove(UserId, ProductId),
}

/// The server side of the fake: listings per endpoint, favourites per user,
/// and a log of every request it received.
#[derive(Default)]
pub struct FakeServer {
    listings: HashMap<String, Vec<Product>>,
    favourites: HashMap<UserId, HashSet<ProductId>>,
    failing: HashSet<Route>,
    failing_counts: HashSet<ProductId>,
    delays: HashMap<Route, usize>,
    requests: Vec<Request>,
}

impl FakeServer {
    fn check(&self, route: Route, url: &str) -> Result<(), ApiError> {
        if self.failing.contains(&route) {
            Err(ApiError::Status { url: url.to_string(), status: 500 })
        } else {
            Ok(())
        }
    }

    fn like_count(&self, product: &ProductId) -> u64 {
        self.favourites.values().filter(|ids| ids.contains(product)).count() as u64
    }
}

/// A client handle onto a shared [`FakeServer`]. Every request yields to the
/// scheduler at least once before it is answered, like a real round trip
/// would.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    server: Rc<RefCell<FakeServer>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, category: &CategorySchema, entries: Vec<Value>) {
        let products = entries
            .into_iter()
            .map(|entry| Product::from_value(entry, &category.id_field).unwrap())
            .collect();
        self.server.borrow_mut().listings.insert(category.endpoint.clone(), products);
    }

    pub fn favourite(&self, user: &UserId, product: &str) {
        self.server
            .borrow_mut()
            .favourites
            .entry(user.clone())
            .or_default()
            .insert(ProductId::new(product));
    }

    pub fn fail(&self, route: Route) {
        self.server.borrow_mut().failing.insert(route);
    }

    pub fn heal(&self, route: Route) {
        self.server.borrow_mut().failing.remove(&route);
    }

    pub fn fail_count_for(&self, product: &str) {
        self.server.borrow_mut().failing_counts.insert(ProductId::new(product));
    }

    /// Makes every request on `route` take `yields` more scheduler turns.
    pub fn delay(&self, route: Route, yields: usize) {
        self.server.borrow_mut().delays.insert(route, yields);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.server.borrow().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.server.borrow_mut().requests.clear();
    }

    pub fn count_requests_for(&self, product: &str) -> usize {
        let product = ProductId::new(product);
        self.requests()
            .iter()
            .filter(|request| matches!(request, Request::Count(id) if *id == product))
            .count()
    }

    pub fn server_favourites(&self, user: &UserId) -> HashSet<ProductId> {
        self.server.borrow().favourites.get(user).cloned().unwrap_or_default()
    }

    async fn round_trip(&self, route: Route) {
        let extra = self.server.borrow().delays.get(&route).copied().unwrap_or(0);
        for _ in 0..=extra {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, request: Request) {
        self.server.borrow_mut().requests.push(request);
    }
}

impl CatalogApi for FakeCatalog {
    async fn fetch_products(&self, category: &CategorySchema) -> Result<Vec<Product>, ApiError> {
        self.record(Request::Products(category.endpoint.clone()));
        self.round_trip(Route::Products).await;
        let server = self.server.borrow();
        server.check(Route::Products, &category.endpoint)?;
        Ok(server.listings.get(&category.endpoint).cloned().unwrap_or_default())
    }

    async fn fetch_like_count(&self, product: &ProductId) -> Result<u64, ApiError> {
        self.record(Request::Count(product.clone()));
        self.round_trip(Route::Count).await;
        let server = self.server.borrow();
        server.check(Route::Count, "favourites/count")?;
        if server.failing_counts.contains(product) {
            return Err(ApiError::Status { url: format!("favourites/count/{product}"), status: 503 });
        }
        Ok(server.like_count(product))
    }

    async fn fetch_favourites(&self, user: &UserId) -> Result<Vec<ProductId>, ApiError> {
        self.record(Request::Favourites(user.clone()));
        self.round_trip(Route::Favourites).await;
        let server = self.server.borrow();
        server.check(Route::Favourites, "favourites/all")?;
        let mut ids: Vec<_> =
            server.favourites.get(user).into_iter().flatten().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn add_favourite(&self, user: &UserId, product: &ProductId) -> Result<(), ApiError> {
        self.record(Request::Add(user.clone(), product.clone()));
        self.round_trip(Route::Add).await;
        let mut server = self.server.borrow_mut();
        server.check(Route::Add, "favourites/add")?;
        server.favourites.entry(user.clone()).or_default().insert(product.clone());
        Ok(())
    }

    async fn remove_favourite(&self, user: &UserId, product: &ProductId) -> Result<(), ApiError> {
        self.record(Request::Remove(user.clone(), product.clone()));
        self.round_trip(Route::Remove).await;
        let mut server = self.server.borrow_mut();
        server.check(Route::Remove, "favourites/remove")?;
        if let Some(ids) = server.favourites.get_mut(user) {
            ids.remove(product);
        }
        Ok(())
    }

    fn asset_url(&self, path: &str) -> String {
        format!("http://fake.test/{path}")
    }
}
