//! # Cash Register Repository
//!
//! Persistence of the register lifecycle and its running balance.
//!
//! ## Register Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Register Lifecycle                                │
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── insert() → status 'open'                                       │
//! │         (partial unique index: only one 'open' row may exist)          │
//! │                                                                         │
//! │  2. POST                                                               │
//! │     └── apply_balance_delta() → total_balance_cents += delta           │
//! │         (guarded: WHERE status = 'open')                               │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── close() → status 'closed', closed_at, closed_by                │
//! │         (never reopened; the next opening inserts a new row)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::{CashRegister, Money};

/// Repository for read-only register lookups on the pool.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Gets a register by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(
            r#"
            SELECT id, opening_balance_cents, total_balance_cents, status,
                   opened_at, opened_by, closed_at, closed_by
            FROM cash_registers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Gets the currently open register, if any.
    pub async fn current_open(&self) -> DbResult<Option<CashRegister>> {
        let mut conn = self.pool.acquire().await?;
        fetch_open(&mut conn).await
    }

    /// Gets the most recently closed register, if any.
    pub async fn last_closed(&self) -> DbResult<Option<CashRegister>> {
        let register = sqlx::query_as::<_, CashRegister>(
            r#"
            SELECT id, opening_balance_cents, total_balance_cents, status,
                   opened_at, opened_by, closed_at, closed_by
            FROM cash_registers
            WHERE status = 'closed'
            ORDER BY closed_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Counts all registers ever opened.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cash_registers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transactional Operations
// =============================================================================

/// Gets the open register inside the caller's transaction.
pub async fn fetch_open(conn: &mut SqliteConnection) -> DbResult<Option<CashRegister>> {
    let register = sqlx::query_as::<_, CashRegister>(
        r#"
        SELECT id, opening_balance_cents, total_balance_cents, status,
               opened_at, opened_by, closed_at, closed_by
        FROM cash_registers
        WHERE status = 'open'
        LIMIT 1
        "#,
    )
    .fetch_optional(conn)
    .await?;

    Ok(register)
}

/// Inserts a freshly opened register.
///
/// ## Errors
/// `DbError::UniqueViolation { field: "cash_registers.status" }` when
/// another register is already open.
pub async fn insert(conn: &mut SqliteConnection, register: &CashRegister) -> DbResult<()> {
    debug!(id = %register.id, opening_balance = %register.opening_balance(), "Inserting register");

    sqlx::query(
        r#"
        INSERT INTO cash_registers (
            id, opening_balance_cents, total_balance_cents, status,
            opened_at, opened_by, closed_at, closed_by
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&register.id)
    .bind(register.opening_balance_cents)
    .bind(register.total_balance_cents)
    .bind(register.status)
    .bind(register.opened_at)
    .bind(&register.opened_by)
    .bind(register.closed_at)
    .bind(&register.closed_by)
    .execute(conn)
    .await?;

    Ok(())
}

/// Persists the closing of `register` (already closed in memory).
///
/// Guarded on `status = 'open'`, so a register can only be closed once.
pub async fn close(conn: &mut SqliteConnection, register: &CashRegister) -> DbResult<()> {
    debug!(id = %register.id, "Closing register");

    let result = sqlx::query(
        r#"
        UPDATE cash_registers SET
            status = 'closed',
            closed_at = ?2,
            closed_by = ?3
        WHERE id = ?1 AND status = 'open'
        "#,
    )
    .bind(&register.id)
    .bind(register.closed_at)
    .bind(&register.closed_by)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("CashRegister (open)", &register.id));
    }

    Ok(())
}

/// Adds `delta` to the running balance of an open register.
///
/// ## Delta Update
/// ```text
/// ❌ read balance, add in memory, write back  (lost updates)
/// ✅ UPDATE ... SET total = total + ?         (atomic in the store)
/// ```
///
/// ## Returns
/// The new balance.
pub async fn apply_balance_delta(
    conn: &mut SqliteConnection,
    register_id: &str,
    delta: Money,
) -> DbResult<Money> {
    debug!(id = %register_id, delta = %delta, "Applying balance delta");

    let balance: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE cash_registers
        SET total_balance_cents = total_balance_cents + ?2
        WHERE id = ?1 AND status = 'open'
        RETURNING total_balance_cents
        "#,
    )
    .bind(register_id)
    .bind(delta.cents())
    .fetch_optional(conn)
    .await?;

    balance
        .map(Money::from_cents)
        .ok_or_else(|| DbError::not_found("CashRegister (open)", register_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use till_core::{OperatorId, RegisterStatus};

    fn operator() -> OperatorId {
        OperatorId::new("manager").unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch_open() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = CashRegister::open(Money::from_cents(10000), &operator(), Utc::now());

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &register).await.unwrap();
        let open = fetch_open(&mut tx).await.unwrap().unwrap();
        tx.commit().await.unwrap();

        assert_eq!(open.id, register.id);
        assert_eq!(open.status, RegisterStatus::Open);
        assert_eq!(open.total_balance_cents, 10000);
        assert_eq!(db.registers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_open_register_violates_unique_index() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &CashRegister::open(Money::zero(), &operator(), Utc::now()))
            .await
            .unwrap();
        let err = insert(&mut tx, &CashRegister::open(Money::zero(), &operator(), Utc::now()))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation_on("cash_registers.status"));
    }

    #[tokio::test]
    async fn test_balance_delta_and_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut register = CashRegister::open(Money::from_cents(10000), &operator(), Utc::now());

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &register).await.unwrap();
        let balance = apply_balance_delta(&mut tx, &register.id, Money::from_cents(-3000))
            .await
            .unwrap();
        assert_eq!(balance.cents(), 7000);

        register.close(&operator(), Utc::now());
        close(&mut tx, &register).await.unwrap();

        // Closed registers accept neither postings nor a second close
        let err = apply_balance_delta(&mut tx, &register.id, Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(close(&mut tx, &register).await.unwrap_err().is_not_found());
        tx.commit().await.unwrap();

        let closed = db.registers().last_closed().await.unwrap().unwrap();
        assert_eq!(closed.id, register.id);
        assert_eq!(closed.total_balance_cents, 7000);
        assert!(db.registers().current_open().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_closed_is_most_recent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let start = Utc::now();

        let mut tx = db.begin().await.unwrap();
        for (i, cents) in [1000_i64, 2000].iter().enumerate() {
            let opened = start + Duration::minutes(i as i64 * 10);
            let mut register = CashRegister::open(Money::from_cents(*cents), &operator(), opened);
            insert(&mut tx, &register).await.unwrap();
            register.close(&operator(), opened + Duration::minutes(5));
            close(&mut tx, &register).await.unwrap();
        }
        tx.commit().await.unwrap();

        let last = db.registers().last_closed().await.unwrap().unwrap();
        assert_eq!(last.opening_balance_cents, 2000);
    }
}
