//! # Receipt and Refund Commands

use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use crate::Context;
use till_core::{Money, RefundLine, SaleReceipt};
use till_ledger::{RefundOutcome, Till};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    #[serde(flatten)]
    pub receipt: SaleReceipt,
    pub sub_total: Money,
    pub total_cost: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub receipt_code: String,
    pub total: Money,
}

/// `till receipt <CODE>`
pub async fn receipt(till: &Till, code: &str) -> Result<ReceiptResponse, CliError> {
    debug!(code = %code, "receipt command");

    let receipt = till
        .refunds()
        .by_sale_code(code)
        .await?
        .ok_or_else(|| CliError::not_found("Receipt", code))?;

    Ok(ReceiptResponse {
        sub_total: receipt.sub_total(),
        total_cost: receipt.total_cost(),
        receipt,
    })
}

/// `till quote <CODE> <ITEM:QTY>...`
pub async fn quote(till: &Till, code: &str, lines: &[RefundLine]) -> Result<QuoteResponse, CliError> {
    debug!(code = %code, lines = lines.len(), "quote command");

    let total = till.refunds().quote(code, lines).await?;
    Ok(QuoteResponse {
        receipt_code: code.to_string(),
        total,
    })
}

/// `till refund <CODE> <ITEM:QTY>... [--warehouse ID]`
///
/// Falls back to the configured default warehouse.
pub async fn refund(
    till: &Till,
    ctx: &Context,
    code: &str,
    warehouse: Option<&str>,
    lines: &[RefundLine],
) -> Result<RefundOutcome, CliError> {
    let warehouse = warehouse
        .or(ctx.default_warehouse.as_deref())
        .ok_or_else(|| CliError::validation("No warehouse given and no default_warehouse_id configured"))?;
    debug!(code = %code, warehouse = %warehouse, lines = lines.len(), "refund command");

    Ok(till.refunds().refund(&ctx.operator, code, warehouse, lines).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, till};
    use crate::error::ErrorCode;
    use chrono::Utc;
    use till_core::{OperatorId, PaymentMethod, Product, ReceiptStatus, TaxRate};

    /// Stores a paid receipt R-100 with 3 × Cola (2.00, 10% tax).
    async fn seeded() -> (Till, String, String) {
        let till = till().await;
        let db = till.database();

        let cola = Product::new("COLA", "Cola", Money::from_cents(200), TaxRate::from_bps(1000));
        db.products().insert(&cola).await.unwrap();
        let warehouse = db.stock().create_warehouse("Main").await.unwrap();

        let cashier = OperatorId::new("cashier-1").unwrap();
        let mut sale = SaleReceipt::new("R-100", &cashier, PaymentMethod::Card, Utc::now());
        let item_id = sale.add_item(&cola, cola.price(), 3, None).id.clone();
        sale.mark_paid(Money::from_cents(600));
        db.receipts().insert(&sale).await.unwrap();

        (till, item_id, warehouse.id)
    }

    #[tokio::test]
    async fn test_receipt_lookup() {
        let (till, _, _) = seeded().await;

        let found = receipt(&till, "R-100").await.unwrap();
        assert_eq!(found.total_cost, Money::from_cents(600));
        assert_eq!(found.receipt.items.len(), 1);

        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["code"], "R-100");
        assert!(json.get("subTotal").is_some());

        let err = receipt(&till, "R-999").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_quote_then_refund_with_default_warehouse() {
        let (till, item_id, warehouse_id) = seeded().await;
        let ctx = context(Some(&warehouse_id));
        till.registers().open(&ctx.operator, Money::from_cents(1_000)).await.unwrap();
        let lines = [RefundLine::new(item_id, 2)];

        let quoted = quote(&till, "R-100", &lines).await.unwrap();
        assert_eq!(quoted.total, Money::from_cents(440));

        let outcome = refund(&till, &ctx, "R-100", None, &lines).await.unwrap();
        assert_eq!(outcome.total, quoted.total);
        assert_eq!(outcome.restocked[0].quantity, 2);
        assert_eq!(outcome.restocked[0].warehouse_id, warehouse_id);

        let after = receipt(&till, "R-100").await.unwrap();
        assert_eq!(after.receipt.status, ReceiptStatus::Refunded);
    }

    #[tokio::test]
    async fn test_refund_needs_a_warehouse() {
        let (till, item_id, _) = seeded().await;
        let ctx = context(None);
        till.registers().open(&ctx.operator, Money::zero()).await.unwrap();

        let err = refund(&till, &ctx, "R-100", None, &[RefundLine::new(item_id, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_over_refund_is_business_error() {
        let (till, item_id, warehouse_id) = seeded().await;
        let ctx = context(None);
        till.registers().open(&ctx.operator, Money::zero()).await.unwrap();

        let err = refund(&till, &ctx, "R-100", Some(&warehouse_id), &[RefundLine::new(item_id, 4)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }
}
