use async_trait::async_trait;
use pantry_core::BoxError;
use pantry_order::{Order, OrderRepository};
use sqlx::PgPool;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn find_order(
        &self,
        id: i64,
    ) -> Result<Option<Order>, BoxError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let product_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT product_id FROM order_items WHERE order_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Order::new(id, product_ids)))
    }
}
