//! # Sale Receipt Repository
//!
//! Database operations for point-of-sale receipts and their items.
//!
//! ## Receipt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Receipt Lifecycle                                 │
//! │                                                                         │
//! │  1. POINT OF SALE (outside the till)                                   │
//! │     └── insert() → receipt + items, status 'paid'                      │
//! │                                                                         │
//! │  2. LOOKUP                                                             │
//! │     └── get_by_code() → items + product refs (sku, name, tax rate)     │
//! │                                                                         │
//! │  3. REFUND                                                             │
//! │     └── mark_refunded() → status 'refunded', change_given = −total,    │
//! │                           refunded_quantity += n per item              │
//! │         (guarded: WHERE status = 'paid'; trigger keeps 'refunded'     │
//! │          terminal)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::{Money, ProductRef, ReceiptItem, SaleReceipt};

/// Receipt item joined with its product's current catalog data.
#[derive(Debug, FromRow)]
struct ItemWithProductRow {
    #[sqlx(flatten)]
    item: ReceiptItem,
    ref_sku: Option<String>,
    ref_name: Option<String>,
    ref_tax_rate_bps: Option<u32>,
}

impl ItemWithProductRow {
    fn into_item(self) -> ReceiptItem {
        let mut item = self.item;
        item.product = match (self.ref_sku, self.ref_name, self.ref_tax_rate_bps) {
            (Some(sku), Some(name), Some(tax_rate_bps)) => Some(ProductRef {
                id: item.product_id.clone(),
                sku,
                name,
                tax_rate_bps,
            }),
            _ => None,
        };
        item
    }
}

/// Repository for receipt reads and point-of-sale inserts.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Gets a receipt by its code, with items and product references.
    ///
    /// ## Returns
    /// * `Ok(Some(receipt))` - Found
    /// * `Ok(None)` - No receipt with that code
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<SaleReceipt>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_code(&mut conn, code).await
    }

    /// Receipts with `from <= date_time <= to`, oldest first, with items.
    /// Product references are not loaded.
    pub async fn for_period(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<SaleReceipt>> {
        let mut receipts = sqlx::query_as::<_, SaleReceipt>(
            r#"
            SELECT id, code, date_time, cashier_id, payment_method,
                   paid_amount_cents, change_given_cents, status
            FROM sale_receipts
            WHERE date_time BETWEEN ?1 AND ?2
            ORDER BY date_time ASC, rowid ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, ReceiptItem>(
            r#"
            SELECT ri.id, ri.receipt_id, ri.position, ri.product_id, ri.product_name,
                   ri.unit_price_cents, ri.quantity, ri.discount_cents,
                   ri.line_total_cents, ri.refunded_quantity
            FROM receipt_items ri
            INNER JOIN sale_receipts sr ON sr.id = ri.receipt_id
            WHERE sr.date_time BETWEEN ?1 AND ?2
            ORDER BY ri.receipt_id, ri.position
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut by_receipt: HashMap<String, Vec<ReceiptItem>> = HashMap::new();
        for item in items {
            by_receipt.entry(item.receipt_id.clone()).or_default().push(item);
        }
        for receipt in &mut receipts {
            receipt.items = by_receipt.remove(&receipt.id).unwrap_or_default();
        }

        debug!(count = receipts.len(), "Receipts for period");
        Ok(receipts)
    }

    /// Inserts a receipt and its items in one transaction.
    ///
    /// Used by the point-of-sale flow and the seed binary.
    pub async fn insert(&self, receipt: &SaleReceipt) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin_with(crate::pool::BEGIN_IMMEDIATE)
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        insert(&mut tx, receipt).await?;

        crate::commit(tx).await
    }

    /// Counts all receipts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_receipts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transactional Operations
// =============================================================================

/// Gets a receipt by code inside the caller's transaction, with items and
/// product references.
pub async fn fetch_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> DbResult<Option<SaleReceipt>> {
    let receipt = sqlx::query_as::<_, SaleReceipt>(
        r#"
        SELECT id, code, date_time, cashier_id, payment_method,
               paid_amount_cents, change_given_cents, status
        FROM sale_receipts
        WHERE code = ?1
        "#,
    )
    .bind(code)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(mut receipt) = receipt else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, ItemWithProductRow>(
        r#"
        SELECT ri.id, ri.receipt_id, ri.position, ri.product_id, ri.product_name,
               ri.unit_price_cents, ri.quantity, ri.discount_cents,
               ri.line_total_cents, ri.refunded_quantity,
               p.sku AS ref_sku,
               p.name AS ref_name,
               p.tax_rate_bps AS ref_tax_rate_bps
        FROM receipt_items ri
        LEFT JOIN products p ON p.id = ri.product_id
        WHERE ri.receipt_id = ?1
        ORDER BY ri.position
        "#,
    )
    .bind(&receipt.id)
    .fetch_all(&mut *conn)
    .await?;

    receipt.items = rows.into_iter().map(ItemWithProductRow::into_item).collect();

    debug!(code = %code, items = receipt.items.len(), "Loaded receipt");
    Ok(Some(receipt))
}

/// Inserts a receipt and its items inside the caller's transaction.
pub async fn insert(conn: &mut SqliteConnection, receipt: &SaleReceipt) -> DbResult<()> {
    debug!(id = %receipt.id, code = %receipt.code, items = receipt.items.len(), "Inserting receipt");

    sqlx::query(
        r#"
        INSERT INTO sale_receipts (
            id, code, date_time, cashier_id, payment_method,
            paid_amount_cents, change_given_cents, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&receipt.id)
    .bind(&receipt.code)
    .bind(receipt.date_time)
    .bind(&receipt.cashier_id)
    .bind(receipt.payment_method)
    .bind(receipt.paid_amount_cents)
    .bind(receipt.change_given_cents)
    .bind(receipt.status)
    .execute(&mut *conn)
    .await?;

    for item in &receipt.items {
        sqlx::query(
            r#"
            INSERT INTO receipt_items (
                id, receipt_id, position, product_id, product_name,
                unit_price_cents, quantity, discount_cents, line_total_cents,
                refunded_quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&receipt.id)
        .bind(item.position)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.unit_price().cents())
        .bind(item.quantity())
        .bind(item.discount().map(|d| d.cents()))
        .bind(item.line_total().map(|t| t.cents()))
        .bind(item.refunded_quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Marks a PAID receipt refunded and records refunded quantities.
///
/// ## Arguments
/// * `change_given` - Stored on the receipt (the negated refund total)
/// * `items` - `(item_id, quantity)` pairs being refunded
///
/// ## Errors
/// `DbError::NotFound` when the receipt is no longer PAID or a quantity
/// would exceed what was sold. The caller's transaction should then be
/// dropped.
pub async fn mark_refunded(
    conn: &mut SqliteConnection,
    receipt_id: &str,
    change_given: Money,
    items: &[(String, i64)],
) -> DbResult<()> {
    debug!(id = %receipt_id, change_given = %change_given, "Marking receipt refunded");

    let result = sqlx::query(
        r#"
        UPDATE sale_receipts SET
            status = 'refunded',
            change_given_cents = ?2
        WHERE id = ?1 AND status = 'paid'
        "#,
    )
    .bind(receipt_id)
    .bind(change_given.cents())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("SaleReceipt (paid)", receipt_id));
    }

    for (item_id, quantity) in items {
        let result = sqlx::query(
            r#"
            UPDATE receipt_items
            SET refunded_quantity = refunded_quantity + ?3
            WHERE id = ?1 AND receipt_id = ?2
              AND refunded_quantity + ?3 <= quantity
            "#,
        )
        .bind(item_id)
        .bind(receipt_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ReceiptItem (refundable)", item_id));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
