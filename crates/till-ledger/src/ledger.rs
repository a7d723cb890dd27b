//! # Ledger Service
//!
//! Manual cash movements against the open register.
//!
//! ## Posting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(op, amount, type, description)                                 │
//! │                                                                         │
//! │   ┌── one transaction ─────────────────────────────────────────────┐   │
//! │   │ 1. load OPEN register            ──► NoOpenRegister            │   │
//! │   │ 2. build LedgerRecord (now, op, register id)                   │   │
//! │   │ 3. INSERT ledger_records                                       │   │
//! │   │ 4. UPDATE total = total ± amount  (only reached if 3 succeeded)│   │
//! │   └─────────────────────────────────────────────────── commit ─────┘   │
//! │                                                                         │
//! │   INCOME: +amount      EXPENSE: -amount      REFUND: -amount            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Postings are never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{TillError, TillResult};
use crate::WriteGate;
use till_core::validation::{validate_description, validate_period, validate_posting_amount};
use till_core::{LedgerRecord, LedgerType, Money, OperatorId};
use till_db::repository::{ledger, register};
use till_db::Database;

/// Records and reads ledger postings.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db: Database,
    gate: WriteGate,
}

impl LedgerService {
    pub(crate) fn new(db: Database, gate: WriteGate) -> Self {
        LedgerService { db, gate }
    }

    /// Posts a manual movement and adjusts the open register's balance.
    ///
    /// `amount` is a positive magnitude; `record_type` decides the sign.
    ///
    /// ## Errors
    /// - Validation error for a non-positive amount or blank description
    /// - `NoOpenRegister` if the till is closed
    pub async fn record(
        &self,
        operator: &OperatorId,
        amount: Money,
        record_type: LedgerType,
        description: &str,
    ) -> TillResult<LedgerRecord> {
        validate_posting_amount(amount)?;
        let description = validate_description(description)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.db.begin().await?;

        let record = post(&mut tx, operator, amount, record_type, &description).await?;
        till_db::commit(tx).await?;

        info!(
            id = %record.id,
            register_id = %record.register_id,
            record_type = %record_type,
            amount = %amount,
            operator = %operator,
            "Ledger posting recorded"
        );

        Ok(record)
    }

    /// All postings with `from <= date_time <= to`, across registers,
    /// oldest first.
    pub async fn records_for_period(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TillResult<Vec<LedgerRecord>> {
        validate_period(from, to)?;
        Ok(self.db.ledger().for_period(from, to).await?)
    }

    /// Postings owned by one register, in the order they were made.
    pub async fn records_for_register(&self, register_id: &str) -> TillResult<Vec<LedgerRecord>> {
        Ok(self.db.ledger().for_register(register_id).await?)
    }
}

/// Posts to the open register on the caller's connection.
///
/// Shared by manual postings and refunds so both go through the same
/// insert-then-adjust sequence. The caller owns the transaction and the
/// write gate.
pub(crate) async fn post(
    conn: &mut SqliteConnection,
    operator: &OperatorId,
    amount: Money,
    record_type: LedgerType,
    description: &str,
) -> TillResult<LedgerRecord> {
    let current = register::fetch_open(conn)
        .await?
        .ok_or(TillError::NoOpenRegister)?;

    let record = LedgerRecord::new(&current, operator, amount, record_type, description, Utc::now());

    ledger::insert(conn, &record).await?;
    let balance = register::apply_balance_delta(conn, &current.id, record.signed_amount()).await?;

    debug!(register_id = %current.id, balance = %balance, "Register balance updated");

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{empty_till, operator, terminals};
    use chrono::Duration;
    use till_core::CoreError;

    #[tokio::test]
    async fn test_income_then_expense() {
        let till = empty_till().await;
        let op = operator();
        let register = till.registers().open(&op, Money::from_cents(10_000)).await.unwrap();

        let ledger = till.ledger();
        ledger.record(&op, Money::from_cents(5_000), LedgerType::Income, "Float top-up").await.unwrap();
        ledger.record(&op, Money::from_cents(3_000), LedgerType::Expense, "Cleaning supplies").await.unwrap();

        let open = till.registers().current_open().await.unwrap().unwrap();
        assert_eq!(open.total_balance(), Money::from_cents(12_000));

        let records = ledger.records_for_register(&register.id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, LedgerType::Income);
        assert_eq!(records[1].record_type, LedgerType::Expense);
        assert!(records.iter().all(|r| r.operator_id == "cashier-1"));
    }

    #[tokio::test]
    async fn test_balance_equals_opening_plus_signed_postings() {
        let till = empty_till().await;
        let op = operator();
        till.registers().open(&op, Money::from_cents(2_000)).await.unwrap();

        let postings = [
            (1_250, LedgerType::Income),
            (400, LedgerType::Expense),
            (999, LedgerType::Refund),
            (1, LedgerType::Income),
            (3_000, LedgerType::Expense),
            (75, LedgerType::Income),
        ];

        let ledger = till.ledger();
        let mut expected = 2_000;
        for (cents, kind) in postings {
            ledger.record(&op, Money::from_cents(cents), kind, "posting").await.unwrap();
            expected += kind.signed(Money::from_cents(cents)).cents();
        }

        let balance = till.registers().current_open().await.unwrap().unwrap().total_balance();
        assert_eq!(balance.cents(), expected);
        assert_eq!(balance.cents(), 2_000 + 1_250 + 1 + 75 - 400 - 999 - 3_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_postings_from_two_terminals() {
        let shared = terminals(2).await;
        let op = operator();
        let register = shared.tills[0]
            .registers()
            .open(&op, Money::from_cents(1_000))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..40_i64 {
            let ledger = shared.tills[(i % 2) as usize].ledger();
            let op = op.clone();
            let kind = if i % 5 == 0 { LedgerType::Expense } else { LedgerType::Income };
            handles.push(tokio::spawn(async move {
                ledger.record(&op, Money::from_cents(100 + i), kind, "rush hour").await
            }));
        }

        let mut expected = 1_000;
        for handle in handles {
            let record = handle.await.unwrap().unwrap();
            expected += record.signed_amount().cents();
        }

        let records = shared.tills[1].ledger().records_for_register(&register.id).await.unwrap();
        assert_eq!(records.len(), 40);

        let balance = shared.tills[1]
            .registers()
            .current_open()
            .await
            .unwrap()
            .unwrap()
            .total_balance();
        assert_eq!(balance.cents(), expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_postings_on_one_till() {
        let till = empty_till().await;
        let op = operator();
        till.registers().open(&op, Money::zero()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..25 {
            let ledger = till.ledger();
            let op = op.clone();
            handles.push(tokio::spawn(async move {
                ledger.record(&op, Money::from_cents(100), LedgerType::Income, "tip").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let balance = till.registers().current_open().await.unwrap().unwrap().total_balance();
        assert_eq!(balance, Money::from_cents(2_500));
        assert_eq!(till.database().ledger().count().await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_record_without_open_register() {
        let till = empty_till().await;
        let err = till
            .ledger()
            .record(&operator(), Money::from_cents(100), LedgerType::Income, "Float")
            .await
            .unwrap_err();

        assert!(matches!(err, TillError::NoOpenRegister));
        assert_eq!(till.database().ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_postings_rejected_before_write() {
        let till = empty_till().await;
        let op = operator();
        till.registers().open(&op, Money::from_cents(1_000)).await.unwrap();
        let ledger = till.ledger();

        let zero = ledger.record(&op, Money::zero(), LedgerType::Income, "x").await;
        assert!(matches!(zero, Err(TillError::Core(CoreError::Validation(_)))));

        let negative = ledger.record(&op, Money::from_cents(-5), LedgerType::Expense, "x").await;
        assert!(negative.is_err());

        let blank = ledger.record(&op, Money::from_cents(5), LedgerType::Expense, "   ").await;
        assert!(blank.is_err());

        assert_eq!(till.database().ledger().count().await.unwrap(), 0);
        let balance = till.registers().current_open().await.unwrap().unwrap().total_balance();
        assert_eq!(balance, Money::from_cents(1_000));
    }

    #[tokio::test]
    async fn test_description_is_trimmed() {
        let till = empty_till().await;
        let op = operator();
        till.registers().open(&op, Money::zero()).await.unwrap();

        let record = till
            .ledger()
            .record(&op, Money::from_cents(10), LedgerType::Income, "  Tips jar  ")
            .await
            .unwrap();
        assert_eq!(record.description, "Tips jar");
    }

    #[tokio::test]
    async fn test_period_with_no_register_and_no_records() {
        let till = empty_till().await;
        let now = Utc::now();

        let records = till
            .ledger()
            .records_for_period(now - Duration::days(1), now)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_period_spans_registers() {
        let till = empty_till().await;
        let op = operator();
        let start = Utc::now() - Duration::seconds(1);

        till.registers().open(&op, Money::zero()).await.unwrap();
        till.ledger().record(&op, Money::from_cents(100), LedgerType::Income, "first").await.unwrap();
        till.registers().close(&op).await.unwrap();

        till.registers().open(&op, Money::zero()).await.unwrap();
        till.ledger().record(&op, Money::from_cents(200), LedgerType::Income, "second").await.unwrap();

        let records = till
            .ledger()
            .records_for_period(start, Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "first");
        assert_eq!(records[1].description, "second");
        assert_ne!(records[0].register_id, records[1].register_id);
    }

    #[tokio::test]
    async fn test_reversed_period_rejected() {
        let till = empty_till().await;
        let now = Utc::now();
        let err = till
            .ledger()
            .records_for_period(now, now - Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TillError::Core(CoreError::Validation(_))));
    }
}
