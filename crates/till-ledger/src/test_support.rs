//! Shared fixtures for service tests.
//!
//! Fixtures run against a fresh in-memory database, except [`terminals`],
//! which opens several independent tills on one temporary file.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use till_core::{Money, OperatorId, PaymentMethod, Product, SaleReceipt, TaxRate, Warehouse};
use till_db::DbConfig;

use crate::Till;

/// A till with a catalog, a warehouse and one paid receipt.
pub struct Fixture {
    pub till: Till,
    pub operator: OperatorId,
    /// 10.00 at 10% tax.
    pub product_x: Product,
    /// 5.00 at 0% tax.
    pub product_y: Product,
    pub warehouse: Warehouse,
    /// R-001: 2 × X, 1 × Y, paid in cash.
    pub receipt: SaleReceipt,
}

impl Fixture {
    /// Item id of the X line on R-001.
    pub fn item_x(&self) -> String {
        self.receipt.items[0].id.clone()
    }

    /// Item id of the Y line on R-001.
    pub fn item_y(&self) -> String {
        self.receipt.items[1].id.clone()
    }

    /// Stock of `product` in the fixture warehouse, zero when never stocked.
    pub async fn stock_of(&self, product: &Product) -> i64 {
        self.till
            .database()
            .stock()
            .get(&product.id, &self.warehouse.id)
            .await
            .unwrap()
            .map(|s| s.quantity)
            .unwrap_or(0)
    }
}

pub async fn empty_till() -> Till {
    Till::with_db_config(DbConfig::in_memory()).await.unwrap()
}

/// Independent tills on one database file, each with its own pool and
/// write gate, like terminals sharing a store.
pub struct Terminals {
    pub path: PathBuf,
    pub tills: Vec<Till>,
}

impl Drop for Terminals {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub async fn terminals(count: usize) -> Terminals {
    let path = std::env::temp_dir().join(format!("till-terminals-{}.db", uuid::Uuid::new_v4()));

    let mut tills = Vec::with_capacity(count);
    for i in 0..count {
        let config = DbConfig::new(&path).run_migrations(i == 0);
        tills.push(Till::with_db_config(config).await.unwrap());
    }

    Terminals { path, tills }
}

pub fn operator() -> OperatorId {
    OperatorId::new("cashier-1").unwrap()
}

/// Builds and stores a paid receipt.
pub async fn paid_receipt(
    till: &Till,
    code: &str,
    lines: &[(&Product, i64)],
    when: DateTime<Utc>,
) -> SaleReceipt {
    let mut receipt = SaleReceipt::new(code, &operator(), PaymentMethod::Cash, when);
    for (product, quantity) in lines {
        receipt.add_item(product, product.price(), *quantity, None);
    }
    let total = receipt.total_cost();
    receipt.mark_paid(total);

    till.database().receipts().insert(&receipt).await.unwrap();
    receipt
}

pub async fn fixture() -> Fixture {
    let till = empty_till().await;
    let db = till.database();

    let product_x = Product::new("X", "Product X", Money::from_cents(1000), TaxRate::from_bps(1000));
    let product_y = Product::new("Y", "Product Y", Money::from_cents(500), TaxRate::zero());
    db.products().insert(&product_x).await.unwrap();
    db.products().insert(&product_y).await.unwrap();

    let warehouse = db.stock().create_warehouse("Main").await.unwrap();

    let receipt = paid_receipt(&till, "R-001", &[(&product_x, 2), (&product_y, 1)], Utc::now()).await;

    Fixture {
        till,
        operator: operator(),
        product_x,
        product_y,
        warehouse,
        receipt,
    }
}
