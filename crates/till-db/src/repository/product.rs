//! # Product Repository
//!
//! The narrow slice of the catalog the till needs: identity, name, price
//! and the tax rate used to rebuild tax-inclusive refund values.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, tax_rate_bps, is_active,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, price_cents, tax_rate_bps, is_active,
                   created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a product.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the SKU is taken.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, price_cents, tax_rate_bps, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Changes a product's catalog tax rate.
    ///
    /// Receipts keep their price snapshot, but refunds pick up the new rate.
    pub async fn update_tax_rate(&self, id: &str, tax_rate_bps: u32) -> DbResult<()> {
        debug!(id = %id, tax_rate_bps, "Updating tax rate");

        let result = sqlx::query(
            r#"
            UPDATE products SET tax_rate_bps = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(tax_rate_bps)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use till_core::{Money, TaxRate};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cola = Product::new("COLA-330", "Cola 330ml", Money::from_cents(199), TaxRate::from_bps(825));

        db.products().insert(&cola).await.unwrap();

        let by_id = db.products().get_by_id(&cola.id).await.unwrap().unwrap();
        assert_eq!(by_id.tax_rate_bps, 825);
        assert!(by_id.is_active);

        let by_sku = db.products().get_by_sku("COLA-330").await.unwrap().unwrap();
        assert_eq!(by_sku.id, cola.id);
        assert!(db.products().get_by_sku("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = Product::new("DUP", "A", Money::from_cents(100), TaxRate::zero());
        let b = Product::new("DUP", "B", Money::from_cents(100), TaxRate::zero());

        db.products().insert(&a).await.unwrap();
        let err = db.products().insert(&b).await.unwrap_err();
        assert!(err.is_unique_violation_on("products.sku"));
    }

    #[tokio::test]
    async fn test_update_tax_rate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cola = Product::new("COLA", "Cola", Money::from_cents(199), TaxRate::zero());
        db.products().insert(&cola).await.unwrap();

        db.products().update_tax_rate(&cola.id, 1000).await.unwrap();
        let updated = db.products().get_by_id(&cola.id).await.unwrap().unwrap();
        assert_eq!(updated.tax_rate_bps, 1000);

        assert!(db.products().update_tax_rate("missing", 0).await.unwrap_err().is_not_found());
    }
}
