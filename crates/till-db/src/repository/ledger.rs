//! # Ledger Repository
//!
//! Append-only storage of register postings.
//!
//! Records are only ever inserted. A trigger in the schema aborts any
//! UPDATE, so a posting can't be rewritten after the fact.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use till_core::LedgerRecord;

/// Repository for ledger reads on the pool.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Records with `from <= date_time <= to`, oldest first.
    /// Records with equal timestamps keep insertion order.
    pub async fn for_period(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<LedgerRecord>> {
        let records = sqlx::query_as::<_, LedgerRecord>(
            r#"
            SELECT id, register_id, date_time, amount_cents, record_type,
                   description, operator_id
            FROM ledger_records
            WHERE date_time BETWEEN ?1 AND ?2
            ORDER BY date_time ASC, rowid ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Ledger records for period");
        Ok(records)
    }

    /// All records owned by one register, in insertion order.
    pub async fn for_register(&self, register_id: &str) -> DbResult<Vec<LedgerRecord>> {
        let records = sqlx::query_as::<_, LedgerRecord>(
            r#"
            SELECT id, register_id, date_time, amount_cents, record_type,
                   description, operator_id
            FROM ledger_records
            WHERE register_id = ?1
            ORDER BY rowid ASC
            "#,
        )
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Counts all postings.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_records")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Appends a posting inside the caller's transaction.
pub async fn insert(conn: &mut SqliteConnection, record: &LedgerRecord) -> DbResult<()> {
    debug!(
        id = %record.id,
        register_id = %record.register_id,
        record_type = %record.record_type,
        amount = %record.amount(),
        "Inserting ledger record"
    );

    sqlx::query(
        r#"
        INSERT INTO ledger_records (
            id, register_id, date_time, amount_cents, record_type,
            description, operator_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&record.id)
    .bind(&record.register_id)
    .bind(record.date_time)
    .bind(record.amount_cents)
    .bind(record.record_type)
    .bind(&record.description)
    .bind(&record.operator_id)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::register;
    use crate::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use till_core::{CashRegister, LedgerType, Money, OperatorId};

    async fn setup() -> (Database, CashRegister) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let operator = OperatorId::new("manager").unwrap();
        let register = CashRegister::open(Money::zero(), &operator, Utc::now());

        let mut tx = db.begin().await.unwrap();
        register::insert(&mut tx, &register).await.unwrap();
        tx.commit().await.unwrap();

        (db, register)
    }

    fn posting(
        register: &CashRegister,
        cents: i64,
        record_type: LedgerType,
        when: DateTime<Utc>,
    ) -> LedgerRecord {
        let operator = OperatorId::new("manager").unwrap();
        LedgerRecord::new(register, &operator, Money::from_cents(cents), record_type, "test", when)
    }

    #[tokio::test]
    async fn test_period_bounds_are_inclusive() {
        let (db, register) = setup().await;
        let base = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

        let mut tx = db.begin().await.unwrap();
        for offset in [-1_i64, 0, 30, 60, 61] {
            let record = posting(&register, 100, LedgerType::Income, base + Duration::minutes(offset));
            insert(&mut tx, &record).await.unwrap();
        }
        tx.commit().await.unwrap();

        let records = db
            .ledger()
            .for_period(base, base + Duration::minutes(60))
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].date_time <= w[1].date_time));
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let (db, register) = setup().await;
        let when = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        let first = posting(&register, 100, LedgerType::Income, when);
        let second = posting(&register, 200, LedgerType::Expense, when);

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &first).await.unwrap();
        insert(&mut tx, &second).await.unwrap();
        tx.commit().await.unwrap();

        let records = db.ledger().for_period(when, when).await.unwrap();
        assert_eq!(records, vec![first.clone(), second.clone()]);

        let owned = db.ledger().for_register(&register.id).await.unwrap();
        assert_eq!(owned, vec![first, second]);
    }

    #[tokio::test]
    async fn test_records_are_append_only() {
        let (db, register) = setup().await;
        let record = posting(&register, 100, LedgerType::Income, Utc::now());

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &record).await.unwrap();
        tx.commit().await.unwrap();

        let err: DbError = sqlx::query("UPDATE ledger_records SET amount_cents = 1 WHERE id = ?1")
            .bind(&record.id)
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::QueryFailed(msg) if msg.contains("append-only")));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected_by_store() {
        let (db, register) = setup().await;
        let record = posting(&register, 0, LedgerType::Expense, Utc::now());

        let mut tx = db.begin().await.unwrap();
        assert!(insert(&mut tx, &record).await.is_err());
    }
}
