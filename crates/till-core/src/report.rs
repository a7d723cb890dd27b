//! # Period Reports
//!
//! Partitions ledger postings and sold receipt items of a period into four
//! categories and derives the period totals.
//!
//! ## Report Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PeriodReport                                    │
//! │                                                                         │
//! │  SaleReceipt.items ──────────► sold_products    (SALE)                 │
//! │  LedgerRecord INCOME ────────► manual_income    (INCOME)               │
//! │  LedgerRecord EXPENSE ───────► expenses         (EXPENSE)              │
//! │  LedgerRecord REFUND ────────► refunds          (REFUND)               │
//! │                                                                         │
//! │  Each category: newest first, ties keep insertion order                │
//! │                                                                         │
//! │  totals():                                                              │
//! │    income  = Σ manual_income                                            │
//! │    outcome = Σ expenses + Σ refunds                                     │
//! │    profit  = income − outcome                                           │
//! │    sales   = Σ sold_products   (reported, not part of profit)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Report rows are derived views and never persisted.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{LedgerRecord, LedgerType, SaleReceipt};

// =============================================================================
// Rows
// =============================================================================

/// Report category of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// Item sold through the point of sale.
    SaleIncome,
    Income,
    Expense,
    Refund,
}

impl ReportCategory {
    pub const fn label(&self) -> &'static str {
        match self {
            ReportCategory::SaleIncome => "SALE",
            ReportCategory::Income => "INCOME",
            ReportCategory::Expense => "EXPENSE",
            ReportCategory::Refund => "REFUND",
        }
    }
}

impl From<LedgerType> for ReportCategory {
    fn from(record_type: LedgerType) -> Self {
        match record_type {
            LedgerType::Income => ReportCategory::Income,
            LedgerType::Expense => ReportCategory::Expense,
            LedgerType::Refund => ReportCategory::Refund,
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of a period report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportRow {
    #[ts(as = "String")]
    pub date_time: DateTime<Utc>,
    pub description: String,
    pub category: ReportCategory,
    /// Positive magnitude; the category says which way it moved.
    pub amount_cents: i64,
    /// Operator who posted the record, or the cashier of the receipt.
    pub attributed_to: String,
}

impl ReportRow {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    fn from_record(record: &LedgerRecord) -> Self {
        ReportRow {
            date_time: record.date_time,
            description: record.description.clone(),
            category: record.record_type.into(),
            amount_cents: record.amount_cents,
            attributed_to: record.operator_id.clone(),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Totals derived from a [`PeriodReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportTotals {
    /// Σ manual income.
    pub income: Money,
    /// Σ expenses + Σ refunds.
    pub outcome: Money,
    /// income − outcome.
    pub profit: Money,
    /// Σ sold products. Not folded into income or profit.
    pub sales: Money,
}

/// Categorized activity over an inclusive period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodReport {
    #[ts(as = "String")]
    pub from: DateTime<Utc>,
    #[ts(as = "String")]
    pub to: DateTime<Utc>,
    pub sold_products: Vec<ReportRow>,
    pub manual_income: Vec<ReportRow>,
    pub expenses: Vec<ReportRow>,
    pub refunds: Vec<ReportRow>,
}

impl PeriodReport {
    /// Builds a report from rows already scoped to `[from, to]`.
    ///
    /// `records` and `receipts` are expected in insertion order; that order
    /// breaks ties between rows with the same timestamp.
    pub fn build(
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        records: &[LedgerRecord],
        receipts: &[SaleReceipt],
    ) -> Self {
        let mut report = PeriodReport {
            from,
            to,
            sold_products: Vec::new(),
            manual_income: Vec::new(),
            expenses: Vec::new(),
            refunds: Vec::new(),
        };

        for receipt in receipts {
            for item in &receipt.items {
                report.sold_products.push(ReportRow {
                    date_time: receipt.date_time,
                    description: format!("{} x {}", item.quantity(), item.product_name),
                    category: ReportCategory::SaleIncome,
                    amount_cents: item.effective_total().cents(),
                    attributed_to: receipt.cashier_id.clone(),
                });
            }
        }

        for record in records {
            let row = ReportRow::from_record(record);
            match record.record_type {
                LedgerType::Income => report.manual_income.push(row),
                LedgerType::Expense => report.expenses.push(row),
                LedgerType::Refund => report.refunds.push(row),
            }
        }

        // sort_by is stable
        for rows in [
            &mut report.sold_products,
            &mut report.manual_income,
            &mut report.expenses,
            &mut report.refunds,
        ] {
            rows.sort_by(|a, b| b.date_time.cmp(&a.date_time));
        }

        report
    }

    /// Computes income, outcome, profit and sales.
    pub fn totals(&self) -> ReportTotals {
        let sum = |rows: &[ReportRow]| rows.iter().map(ReportRow::amount).sum::<Money>();

        let income = sum(&self.manual_income);
        let outcome = sum(&self.expenses) + sum(&self.refunds);

        ReportTotals {
            income,
            outcome,
            profit: income - outcome,
            sales: sum(&self.sold_products),
        }
    }

    /// Total number of rows across all categories.
    pub fn row_count(&self) -> usize {
        self.sold_products.len() + self.manual_income.len() + self.expenses.len() + self.refunds.len()
    }
}

// =============================================================================
// Windows
// =============================================================================

/// Convenience report periods. All of them resolve to an inclusive
/// `[from, to]` pair in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportWindow {
    /// Local midnight to the end of today.
    Today,
    /// First to last calendar day of the current month.
    ThisMonth,
    /// One local calendar day.
    Day(NaiveDate),
    /// Arbitrary range, used as given.
    Range {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl ReportWindow {
    /// Resolves the window against the local time zone.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.bounds_at(&Local::now())
    }

    /// Resolves the window relative to `now`, in `now`'s time zone.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use till_core::ReportWindow;
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 30, 0).unwrap();
    /// let (from, to) = ReportWindow::Today.bounds_at(&now);
    /// assert_eq!(from, Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    /// assert!(to < Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap());
    /// ```
    pub fn bounds_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let tz = now.timezone();
        let today = now.date_naive();

        match *self {
            ReportWindow::Today => day_bounds(&tz, today, next_day(today)),
            ReportWindow::Day(date) => day_bounds(&tz, date, next_day(date)),
            ReportWindow::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                let next_first = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
                }
                .unwrap_or_else(|| next_day(first));
                day_bounds(&tz, first, next_first)
            }
            ReportWindow::Range { from, to } => (from, to),
        }
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// `[start of first, start of end_exclusive)` as an inclusive UTC pair.
fn day_bounds<Tz: TimeZone>(
    tz: &Tz,
    first: NaiveDate,
    end_exclusive: NaiveDate,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = start_of_day(tz, first);
    let to = start_of_day(tz, end_exclusive) - Duration::nanoseconds(1);
    (from, to)
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    // A DST gap can skip midnight; the day then starts at the first valid hour.
    (0..24)
        .filter_map(|h| {
            tz.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .next()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

// =============================================================================
// Unit Tests
// =============================================================================
