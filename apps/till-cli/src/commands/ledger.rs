//! # Ledger Commands

use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use crate::Context;
use till_core::{LedgerRecord, LedgerType, Money, ReportWindow};
use till_ledger::Till;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResponse {
    pub record: LedgerRecord,
    /// Register balance after the posting.
    pub balance: Money,
}

/// `till record <TYPE> <AMOUNT> <DESCRIPTION>`
pub async fn record(
    till: &Till,
    ctx: &Context,
    kind: LedgerType,
    amount: Money,
    description: &str,
) -> Result<RecordedResponse, CliError> {
    debug!(kind = %kind, amount = %amount, "record command");

    let record = till.ledger().record(&ctx.operator, amount, kind, description).await?;

    let balance = till
        .database()
        .registers()
        .get_by_id(&record.register_id)
        .await?
        .map(|r| r.total_balance())
        .ok_or_else(|| CliError::not_found("CashRegister", &record.register_id))?;

    Ok(RecordedResponse { record, balance })
}

/// `till records <WINDOW>`
pub async fn records(till: &Till, window: ReportWindow) -> Result<Vec<LedgerRecord>, CliError> {
    let (from, to) = window.bounds();
    debug!(from = %from, to = %to, "records command");

    Ok(till.ledger().records_for_period(from, to).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, till};
    use crate::error::ErrorCode;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_record_reports_new_balance() {
        let till = till().await;
        let ctx = context(None);
        till.registers().open(&ctx.operator, Money::from_cents(10_000)).await.unwrap();

        let income = record(&till, &ctx, LedgerType::Income, Money::from_cents(5_000), "Float")
            .await
            .unwrap();
        assert_eq!(income.balance, Money::from_cents(15_000));

        let expense = record(&till, &ctx, LedgerType::Expense, Money::from_cents(3_000), "Supplies")
            .await
            .unwrap();
        assert_eq!(expense.balance, Money::from_cents(12_000));
        assert_eq!(expense.record.operator_id, "cashier-1");
    }

    #[tokio::test]
    async fn test_record_with_closed_till() {
        let till = till().await;
        let err = record(&till, &context(None), LedgerType::Income, Money::from_cents(1), "x")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoOpenRegister);
    }

    #[tokio::test]
    async fn test_records_in_range() {
        let till = till().await;
        let ctx = context(None);
        till.registers().open(&ctx.operator, Money::zero()).await.unwrap();
        record(&till, &ctx, LedgerType::Income, Money::from_cents(100), "Tips").await.unwrap();

        let window = ReportWindow::Range {
            from: Utc::now() - Duration::hours(1),
            to: Utc::now() + Duration::hours(1),
        };
        let found = records(&till, window).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Tips");
    }
}
