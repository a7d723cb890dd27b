//! # Refund Processor
//!
//! Applies a refund basket to a paid receipt.
//!
//! ## Atomic Refund
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  refund(op, code, warehouse, basket)                                   │
//! │                                                                         │
//! │   ┌── one transaction ─────────────────────────────────────────────┐   │
//! │   │ load receipt by code          ──► ReceiptNotFound              │   │
//! │   │ plan_refund (pure rules)      ──► CoreError                    │   │
//! │   │ 1. REFUND posting + balance   ──► NoOpenRegister               │   │
//! │   │ 2. stock += qty per product   ──► Store (unknown warehouse)    │   │
//! │   │ 3. receipt → REFUNDED, change_given = −total, refunded qty     │   │
//! │   └─────────────────────────────────────────────────── commit ─────┘   │
//! │                                                                         │
//! │   Any failure drops the transaction: no posting, no stock change,      │
//! │   receipt still PAID.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{TillError, TillResult};
use crate::ledger::post;
use crate::WriteGate;
use till_core::validation::{validate_period, validate_posting_amount, validate_receipt_code};
use till_core::{plan_refund, LedgerRecord, LedgerType, Money, OperatorId, RefundLine, SaleReceipt, StockEntry};
use till_db::repository::{receipt, stock};
use till_db::Database;

/// Result of a completed refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub receipt_code: String,
    /// Tax-inclusive amount paid back to the customer.
    pub total: Money,
    /// The REFUND posting.
    pub ledger_record: LedgerRecord,
    /// Stock rows after the restock, one per refunded product.
    pub restocked: Vec<StockEntry>,
}

/// Looks up receipts and refunds them.
#[derive(Debug, Clone)]
pub struct RefundProcessor {
    db: Database,
    gate: WriteGate,
}

impl RefundProcessor {
    pub(crate) fn new(db: Database, gate: WriteGate) -> Self {
        RefundProcessor { db, gate }
    }

    // =========================================================================
    // Receipt Reads
    // =========================================================================

    /// Receipt by code, with items and their product references.
    pub async fn by_sale_code(&self, code: &str) -> TillResult<Option<SaleReceipt>> {
        validate_receipt_code(code)?;
        Ok(self.db.receipts().get_by_code(code.trim()).await?)
    }

    /// Receipts with `from <= date_time <= to`, with items but without
    /// product references.
    pub async fn receipts_for_period(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TillResult<Vec<SaleReceipt>> {
        validate_period(from, to)?;
        Ok(self.db.receipts().for_period(from, to).await?)
    }

    // =========================================================================
    // Refunds
    // =========================================================================

    /// Computes the refund total for `basket` without changing anything.
    pub async fn quote(&self, code: &str, basket: &[RefundLine]) -> TillResult<Money> {
        let receipt = self
            .by_sale_code(code)
            .await?
            .ok_or_else(|| TillError::ReceiptNotFound { code: code.to_string() })?;

        let plan = plan_refund(&receipt, basket)?;
        debug!(code = %receipt.code, total = %plan.total, "Refund quoted");

        Ok(plan.total)
    }

    /// Refunds `basket` from receipt `code`, returning goods to
    /// `warehouse_id`.
    ///
    /// ## Errors
    /// - `ReceiptNotFound` for an unknown code
    /// - `Core` when the basket breaks a refund rule
    /// - `NoOpenRegister` when the till is closed
    /// - `Store` for an unknown warehouse or any persistence failure
    ///
    /// Nothing is written when an error is returned.
    pub async fn refund(
        &self,
        operator: &OperatorId,
        code: &str,
        warehouse_id: &str,
        basket: &[RefundLine],
    ) -> TillResult<RefundOutcome> {
        validate_receipt_code(code)?;
        let code = code.trim();

        let _guard = self.gate.lock().await;
        let mut tx = self.db.begin().await?;

        let sale = receipt::fetch_by_code(&mut tx, code)
            .await?
            .ok_or_else(|| TillError::ReceiptNotFound { code: code.to_string() })?;

        let plan = plan_refund(&sale, basket).inspect_err(|e| {
            warn!(code = %code, error = %e, "Refund rejected");
        })?;
        validate_posting_amount(plan.total)?;

        let ledger_record = post(
            &mut tx,
            operator,
            plan.total,
            LedgerType::Refund,
            &plan.ledger_description(),
        )
        .await?;

        let mut restocked = Vec::with_capacity(plan.restocks.len());
        for restock in &plan.restocks {
            let entry = stock::add_quantity(&mut tx, &restock.product_id, warehouse_id, restock.quantity).await?;
            restocked.push(entry);
        }

        let refunded: Vec<(String, i64)> = plan
            .items
            .iter()
            .map(|item| (item.item_id.clone(), item.quantity))
            .collect();
        receipt::mark_refunded(&mut tx, &sale.id, plan.change_given(), &refunded).await?;

        till_db::commit(tx).await?;

        info!(
            code = %code,
            total = %plan.total,
            items = plan.items.len(),
            warehouse_id = %warehouse_id,
            operator = %operator,
            "Refund completed"
        );

        Ok(RefundOutcome {
            receipt_code: plan.receipt_code,
            total: plan.total,
            ledger_record,
            restocked,
        })
    }
}
