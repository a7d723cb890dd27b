//! # Stock Repository
//!
//! Warehouses and per-warehouse stock levels.
//!
//! ## Restock Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  (product, warehouse) row exists?                                  │
//! │     ├── yes → quantity = quantity + n     (delta, never absolute)  │
//! │     └── no  → new row with quantity n                              │
//! │                                                                     │
//! │  Both paths are one UPSERT on UNIQUE(product_id, warehouse_id).    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use till_core::{StockEntry, Warehouse};

/// Repository for warehouse and stock reads on the pool.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Gets the stock row of a product in a warehouse.
    pub async fn get(&self, product_id: &str, warehouse_id: &str) -> DbResult<Option<StockEntry>> {
        let entry = sqlx::query_as::<_, StockEntry>(
            r#"
            SELECT id, product_id, warehouse_id, quantity, updated_at
            FROM stock
            WHERE product_id = ?1 AND warehouse_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Gets a warehouse by ID.
    pub async fn get_warehouse(&self, id: &str) -> DbResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>(
            "SELECT id, name, created_at FROM warehouses WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(warehouse)
    }

    /// Creates a warehouse.
    pub async fn create_warehouse(&self, name: &str) -> DbResult<Warehouse> {
        let warehouse = Warehouse {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %warehouse.id, name = %warehouse.name, "Creating warehouse");

        sqlx::query("INSERT INTO warehouses (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&warehouse.id)
            .bind(&warehouse.name)
            .bind(warehouse.created_at)
            .execute(&self.pool)
            .await?;

        Ok(warehouse)
    }

    /// Adds stock outside of any larger transaction (seeding, receiving).
    pub async fn add_quantity(
        &self,
        product_id: &str,
        warehouse_id: &str,
        quantity: i64,
    ) -> DbResult<StockEntry> {
        let mut conn = self.pool.acquire().await?;
        add_quantity(&mut conn, product_id, warehouse_id, quantity).await
    }
}

/// Adds `quantity` to a product's stock in a warehouse, creating the row
/// when the product has never been stocked there.
///
/// ## Errors
/// `DbError::ForeignKeyViolation` for an unknown product or warehouse.
pub async fn add_quantity(
    conn: &mut SqliteConnection,
    product_id: &str,
    warehouse_id: &str,
    quantity: i64,
) -> DbResult<StockEntry> {
    debug!(product_id = %product_id, warehouse_id = %warehouse_id, quantity, "Adding stock");

    let entry = sqlx::query_as::<_, StockEntry>(
        r#"
        INSERT INTO stock (id, product_id, warehouse_id, quantity, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (product_id, warehouse_id) DO UPDATE SET
            quantity = quantity + excluded.quantity,
            updated_at = excluded.updated_at
        RETURNING id, product_id, warehouse_id, quantity, updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(product_id)
    .bind(warehouse_id)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;

    Ok(entry)
}
