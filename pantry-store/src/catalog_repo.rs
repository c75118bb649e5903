use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pantry_catalog::{Product, ProductPatch, ProductTypeError};
use pantry_core::{BoxError, ProductRepository};
use sqlx::PgPool;
use tracing::debug;

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    product_type: String,
    available: i32,
    lead_time: i32,
    name: String,
    expiry_date: Option<DateTime<Utc>>,
    season_start_date: Option<DateTime<Utc>>,
    season_end_date: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = ProductTypeError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            product_type: row.product_type.parse()?,
            available: row.available,
            lead_time: row.lead_time,
            name: row.name,
            expiry_date: row.expiry_date,
            season_start_date: row.season_start_date,
            season_end_date: row.season_end_date,
        })
    }
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn find_product_by_id(
        &self,
        id: i64,
    ) -> Result<Option<Product>, BoxError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, product_type, available, lead_time, name, expiry_date, season_start_date, season_end_date FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Product::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn update_product(
        &self,
        id: i64,
        patch: ProductPatch,
    ) -> Result<(), BoxError> {
        if patch.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET available = COALESCE($2, available),
                lead_time = COALESCE($3, lead_time),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.available)
        .bind(patch.lead_time)
        .execute(&self.pool)
        .await?;

        debug!("Patched product {} ({} rows)", id, result.rows_affected());
        Ok(())
    }
}
