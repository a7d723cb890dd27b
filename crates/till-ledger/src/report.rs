//! # Report Aggregator
//!
//! Reads ledger postings and sale receipts for a period and hands them to
//! [`PeriodReport::build`] for partitioning.
//!
//! ```text
//!  ledger_records ─┐                         ┌─► sold_products (SALE)
//!  [from, to]      ├─► PeriodReport::build ──┼─► manual_income (INCOME)
//!  sale_receipts ──┘                         ├─► expenses      (EXPENSE)
//!  [from, to]                                └─► refunds       (REFUND)
//! ```
//!
//! Reads only; the write gate is never taken.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::TillResult;
use till_core::validation::validate_period;
use till_core::{PeriodReport, ReportWindow};
use till_db::Database;

/// Builds period reports.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    db: Database,
}

impl ReportAggregator {
    pub(crate) fn new(db: Database) -> Self {
        ReportAggregator { db }
    }

    /// Report over the inclusive period `[from, to]`.
    ///
    /// ## Errors
    /// Validation error when `from > to`.
    pub async fn period_report(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> TillResult<PeriodReport> {
        validate_period(from, to)?;

        let records = self.db.ledger().for_period(from, to).await?;
        let receipts = self.db.receipts().for_period(from, to).await?;

        let report = PeriodReport::build(from, to, &records, &receipts);
        debug!(
            from = %from,
            to = %to,
            rows = report.row_count(),
            "Period report built"
        );

        Ok(report)
    }

    /// Report for a convenience window, resolved in the local time zone.
    pub async fn report_for(&self, window: ReportWindow) -> TillResult<PeriodReport> {
        let (from, to) = window.bounds();
        self.period_report(from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, paid_receipt};
    use chrono::Duration;
    use till_core::{LedgerType, Money, RefundLine, ReportCategory};

    #[tokio::test]
    async fn test_every_row_lands_in_one_category() {
        let fx = fixture().await;
        let op = &fx.operator;
        let start = Utc::now() - Duration::hours(1);

        fx.till.registers().open(op, Money::from_cents(10_000)).await.unwrap();
        let ledger = fx.till.ledger();
        ledger.record(op, Money::from_cents(5_000), LedgerType::Income, "Float").await.unwrap();
        ledger.record(op, Money::from_cents(2_000), LedgerType::Income, "Tips").await.unwrap();
        ledger.record(op, Money::from_cents(1_200), LedgerType::Expense, "Supplies").await.unwrap();
        fx.till
            .refunds()
            .refund(op, "R-001", &fx.warehouse.id, &[RefundLine::new(fx.item_y(), 1)])
            .await
            .unwrap();
        paid_receipt(&fx.till, "R-002", &[(&fx.product_x, 3)], Utc::now()).await;

        let report = fx
            .till
            .reports()
            .period_report(start, Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        // R-001 (2 items, still listed after its refund) + R-002 (1 item)
        assert_eq!(report.sold_products.len(), 3);
        assert_eq!(report.manual_income.len(), 2);
        assert_eq!(report.expenses.len(), 1);
        assert_eq!(report.refunds.len(), 1);
        assert_eq!(report.row_count(), 3 + fx.till.database().ledger().count().await.unwrap() as usize);

        assert!(report.sold_products.iter().all(|r| r.category == ReportCategory::SaleIncome));
        assert!(report.refunds.iter().all(|r| r.category == ReportCategory::Refund));
        assert_eq!(report.refunds[0].description, "Refund for receipt R-001");
        assert_eq!(report.refunds[0].amount(), Money::from_cents(500));

        // Newest first: Tips was recorded after Float
        assert!(report.manual_income[0].date_time >= report.manual_income[1].date_time);
        assert_eq!(report.sold_products[0].description, "3 x Product X");

        let totals = report.totals();
        assert_eq!(totals.income, Money::from_cents(7_000));
        assert_eq!(totals.outcome, Money::from_cents(1_700));
        assert_eq!(totals.profit, Money::from_cents(5_300));
        assert_eq!(totals.sales, Money::from_cents(2_000 + 500 + 3_000));
    }

    #[tokio::test]
    async fn test_period_excludes_rows_outside_bounds() {
        let fx = fixture().await;
        paid_receipt(&fx.till, "R-OLD", &[(&fx.product_y, 1)], Utc::now() - Duration::days(10)).await;

        let report = fx
            .till
            .reports()
            .period_report(Utc::now() - Duration::days(1), Utc::now())
            .await
            .unwrap();

        assert_eq!(report.sold_products.len(), 2);
        assert!(report.sold_products.iter().all(|r| r.attributed_to == "cashier-1"));
    }

    #[tokio::test]
    async fn test_report_is_idempotent() {
        let fx = fixture().await;
        let op = &fx.operator;
        fx.till.registers().open(op, Money::zero()).await.unwrap();
        fx.till.ledger().record(op, Money::from_cents(300), LedgerType::Expense, "Milk").await.unwrap();

        let from = Utc::now() - Duration::hours(1);
        let to = Utc::now() + Duration::hours(1);
        let reports = fx.till.reports();

        let first = reports.period_report(from, to).await.unwrap();
        let second = reports.period_report(from, to).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_window_resolves_to_period() {
        let fx = fixture().await;
        let now = Utc::now();
        let (from, to) = ReportWindow::Today.bounds_at(&now);

        let report = fx.till.reports().period_report(from, to).await.unwrap();
        assert_eq!(report.from, from);
        assert_eq!(report.to, to);
        assert_eq!(report.sold_products.len(), 2);

        let range = fx
            .till
            .reports()
            .report_for(ReportWindow::Range { from, to })
            .await
            .unwrap();
        assert_eq!(range, report);
    }

    #[tokio::test]
    async fn test_empty_period() {
        let fx = fixture().await;
        let from = Utc::now() + Duration::days(1);

        let report = fx
            .till
            .reports()
            .period_report(from, from + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(report.row_count(), 0);
        assert_eq!(report.totals().profit, Money::zero());
    }

    #[tokio::test]
    async fn test_reversed_period_rejected() {
        let fx = fixture().await;
        let now = Utc::now();
        assert!(fx.till.reports().period_report(now, now - Duration::seconds(1)).await.is_err());
    }
}
