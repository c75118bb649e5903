//! In-memory product and order storage for local runs and tests

use std::collections::HashMap;

use async_trait::async_trait;
use pantry_catalog::{Product, ProductPatch};
use pantry_core::{BoxError, ProductRepository};
use pantry_order::{Order, OrderRepository};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<i64, Product>>,
    orders: RwLock<HashMap<i64, Order>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn insert_order(&self, order: Order) {
        self.orders.write().await.insert(order.id, order);
    }

    /// Current stored state of a product
    pub async fn product(&self, id: i64) -> Option<Product> {
        self.products.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find_product_by_id(
        &self,
        id: i64,
    ) -> Result<Option<Product>, BoxError> {
        Ok(self.product(id).await)
    }

    async fn update_product(
        &self,
        id: i64,
        patch: ProductPatch,
    ) -> Result<(), BoxError> {
        // Like an UPDATE, patching a missing row touches nothing.
        match self.products.write().await.get_mut(&id) {
            Some(product) => patch.apply_to(product),
            None => debug!("Patch for unknown product {} ignored", id),
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn find_order(
        &self,
        id: i64,
    ) -> Result<Option<Order>, BoxError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }
}
