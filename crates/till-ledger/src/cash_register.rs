//! # Cash Register Service
//!
//! Opening and closing the till.
//!
//! ## Register Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   (none open) ──open(op, balance)──► OPEN ──close(op)──► CLOSED         │
//! │        ▲                               │                    │           │
//! │        │                     record / refund adjust         │           │
//! │        │                     total_balance                  │           │
//! │        └────────────────────────────────────────────────────┘           │
//! │                    next open() creates a NEW register,                 │
//! │                    balance suggested from the last CLOSED one          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{TillError, TillResult};
use crate::WriteGate;
use till_core::validation::validate_opening_balance;
use till_core::{CashRegister, Money, OperatorId};
use till_db::repository::register;
use till_db::Database;

/// Opens, closes and reads cash registers.
#[derive(Debug, Clone)]
pub struct CashRegisterService {
    db: Database,
    gate: WriteGate,
}

impl CashRegisterService {
    pub(crate) fn new(db: Database, gate: WriteGate) -> Self {
        CashRegisterService { db, gate }
    }

    /// Balance carried forward from the most recently closed register, or
    /// zero when no register was ever closed.
    ///
    /// The operator may confirm a different amount when opening.
    pub async fn suggested_opening_balance(&self) -> TillResult<Money> {
        let last = self.db.registers().last_closed().await?;
        Ok(last.map(|r| r.total_balance()).unwrap_or_default())
    }

    /// Opens a new register with an operator-confirmed balance.
    ///
    /// ## Errors
    /// - `RegisterAlreadyOpen` if a register is open
    /// - Validation error for a negative balance
    pub async fn open(&self, operator: &OperatorId, opening_balance: Money) -> TillResult<CashRegister> {
        validate_opening_balance(opening_balance)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.db.begin().await?;

        if let Some(open) = register::fetch_open(&mut tx).await? {
            warn!(id = %open.id, operator = %operator, "Register already open");
            return Err(TillError::RegisterAlreadyOpen);
        }

        let opened = CashRegister::open(opening_balance, operator, Utc::now());
        register::insert(&mut tx, &opened).await?;
        till_db::commit(tx).await?;

        info!(
            id = %opened.id,
            operator = %operator,
            opening_balance = %opening_balance,
            "Cash register opened"
        );

        Ok(opened)
    }

    /// Closes the open register.
    ///
    /// The running balance is kept as-is; it is not recomputed from the
    /// ledger.
    ///
    /// ## Errors
    /// - `NoOpenRegister` if none is open
    pub async fn close(&self, operator: &OperatorId) -> TillResult<CashRegister> {
        let _guard = self.gate.lock().await;
        let mut tx = self.db.begin().await?;

        let Some(mut current) = register::fetch_open(&mut tx).await? else {
            warn!(operator = %operator, "Close requested with no open register");
            return Err(TillError::NoOpenRegister);
        };

        current.close(operator, Utc::now());
        register::close(&mut tx, &current).await?;
        till_db::commit(tx).await?;

        info!(
            id = %current.id,
            operator = %operator,
            balance = %current.total_balance(),
            "Cash register closed"
        );

        Ok(current)
    }

    /// Returns the open register, if any.
    pub async fn current_open(&self) -> TillResult<Option<CashRegister>> {
        Ok(self.db.registers().current_open().await?)
    }

    /// Returns the most recently closed register, if any.
    pub async fn last_closed(&self) -> TillResult<Option<CashRegister>> {
        Ok(self.db.registers().last_closed().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{empty_till, operator, terminals};
    use till_core::{CoreError, RegisterStatus};

    #[tokio::test]
    async fn test_open_sets_balance() {
        let till = empty_till().await;
        let registers = till.registers();

        registers.open(&operator(), Money::from_cents(10_000)).await.unwrap();

        let open = registers.current_open().await.unwrap().unwrap();
        assert_eq!(open.total_balance(), Money::from_cents(10_000));
        assert_eq!(open.opening_balance(), Money::from_cents(10_000));
        assert_eq!(open.opened_by, "cashier-1");
        assert_eq!(open.status, RegisterStatus::Open);
    }

    #[tokio::test]
    async fn test_second_open_rejected() {
        let till = empty_till().await;
        let registers = till.registers();
        let first = registers.open(&operator(), Money::from_cents(10_000)).await.unwrap();

        let err = registers.open(&operator(), Money::from_cents(500)).await.unwrap_err();
        assert!(matches!(err, TillError::RegisterAlreadyOpen));

        assert_eq!(till.database().registers().count().await.unwrap(), 1);
        assert_eq!(registers.current_open().await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_concurrent_opens_only_one_wins() {
        let till = empty_till().await;
        let a = till.registers();
        let b = till.registers();
        let op = operator();

        let (ra, rb) = tokio::join!(
            a.open(&op, Money::from_cents(100)),
            b.open(&op, Money::from_cents(200)),
        );

        let successes = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert!(matches!(
            ra.err().or(rb.err()),
            Some(TillError::RegisterAlreadyOpen)
        ));
        assert_eq!(till.database().registers().count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_opens_across_terminals() {
        let shared = terminals(6).await;
        let op = operator();

        let mut handles = Vec::new();
        for (i, till) in shared.tills.iter().enumerate() {
            let registers = till.registers();
            let op = op.clone();
            handles.push(tokio::spawn(async move {
                registers.open(&op, Money::from_cents(100 * i as i64)).await
            }));
        }

        let mut opened = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => opened += 1,
                Err(err) => assert!(matches!(err, TillError::RegisterAlreadyOpen), "{err}"),
            }
        }

        assert_eq!(opened, 1);
        assert_eq!(shared.tills[0].database().registers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_negative_opening_balance_rejected() {
        let till = empty_till().await;
        let err = till
            .registers()
            .open(&operator(), Money::from_cents(-1))
            .await
            .unwrap_err();

        assert!(matches!(err, TillError::Core(CoreError::Validation(_))));
        assert!(till.registers().current_open().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_without_open_register() {
        let till = empty_till().await;
        let err = till.registers().close(&operator()).await.unwrap_err();
        assert!(matches!(err, TillError::NoOpenRegister));
    }

    #[tokio::test]
    async fn test_close_then_reopen_creates_new_register() {
        let till = empty_till().await;
        let registers = till.registers();
        let op = operator();

        let first = registers.open(&op, Money::from_cents(10_000)).await.unwrap();
        let closed = registers.close(&op).await.unwrap();
        assert_eq!(closed.id, first.id);
        assert_eq!(closed.status, RegisterStatus::Closed);
        assert_eq!(closed.closed_by.as_deref(), Some("cashier-1"));
        assert!(registers.current_open().await.unwrap().is_none());

        let second = registers.open(&op, Money::from_cents(5_000)).await.unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(till.database().registers().count().await.unwrap(), 2);

        let last = registers.last_closed().await.unwrap().unwrap();
        assert_eq!(last.id, first.id);
    }

    #[tokio::test]
    async fn test_suggested_opening_balance_carries_forward() {
        let till = empty_till().await;
        let registers = till.registers();
        let op = operator();

        assert_eq!(registers.suggested_opening_balance().await.unwrap(), Money::zero());

        registers.open(&op, Money::from_cents(10_000)).await.unwrap();
        till.ledger()
            .record(&op, Money::from_cents(2_500), till_core::LedgerType::Income, "Float")
            .await
            .unwrap();
        registers.close(&op).await.unwrap();

        assert_eq!(
            registers.suggested_opening_balance().await.unwrap(),
            Money::from_cents(12_500)
        );

        // Operator may confirm a different amount
        let reopened = registers.open(&op, Money::from_cents(12_000)).await.unwrap();
        assert_eq!(reopened.total_balance(), Money::from_cents(12_000));
    }
}
