use std::sync::Arc;

use pantry_core::{BoxError, Notifier, PolicyError, ProductPolicy, ProductRepository};
use tracing::info;

use crate::repository::OrderRepository;

/// Runs the product policy once per purchased unit of an order
#[derive(Clone)]
pub struct OrderProcessor {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    policy: ProductPolicy,
}

impl OrderProcessor {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let policy = ProductPolicy::new(products.clone(), notifier);
        Self { orders, products, policy }
    }

    /// Process every unit of the order, in order, and return its id.
    ///
    /// Each unit re-reads its product so repeated products see the previous
    /// unit's write. A failure stops the loop; earlier units stay applied.
    pub async fn process_order(&self, order_id: i64) -> Result<i64, OrderError> {
        let order = self
            .orders
            .find_order(order_id)
            .await
            .map_err(OrderError::Repository)?
            .ok_or(OrderError::NotFound(order_id))?;

        info!("Processing order {} with {} units", order.id, order.unit_count());

        for product_id in &order.product_ids {
            let mut product = self
                .products
                .find_product_by_id(*product_id)
                .await
                .map_err(OrderError::Repository)?
                .ok_or(OrderError::ProductNotFound(*product_id))?;

            self.policy.process_one_unit(&mut product).await?;
        }

        Ok(order.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(i64),

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Repository failure: {0}")]
    Repository(#[source] BoxError),
}
