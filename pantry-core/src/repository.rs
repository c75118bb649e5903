use async_trait::async_trait;
use pantry_catalog::{Product, ProductPatch};

use crate::BoxError;

/// Repository trait for product rows
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_product_by_id(
        &self,
        id: i64,
    ) -> Result<Option<Product>, BoxError>;

    /// Apply a partial patch to the row matching `id`.
    /// Not conditional: the caller's view of the row wins.
    async fn update_product(
        &self,
        id: i64,
        patch: ProductPatch,
    ) -> Result<(), BoxError>;
}
