use async_trait::async_trait;
use pantry_core::BoxError;

use crate::models::Order;

/// Repository trait for order lookups
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_order(
        &self,
        id: i64,
    ) -> Result<Option<Order>, BoxError>;
}
