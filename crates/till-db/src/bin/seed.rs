//! # Seed Data Generator
//!
//! Populates a till database with a warehouse, products, stock and paid
//! receipts so refunds and reports can be tried from the CLI.
//!
//! ## Usage
//! ```bash
//! # 50 receipts (default)
//! cargo run -p till-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p till-db --bin seed -- --count 200 --db ./data/till.db
//! ```
//!
//! ## Generated Data
//! - One warehouse named "Main"
//! - One product per catalog entry, tax rate cycling 0%, 5%, 8.25%, 10%
//! - 100 units of stock per product
//! - `count` PAID receipts with 1-4 items each, spread over the last 30 days
//!
//! Receipt codes are `SEED-NNNN`. The generated warehouse id is printed for
//! use with `till refund --warehouse`.

use chrono::{Duration, Utc};
use std::env;
use till_core::{Money, OperatorId, PaymentMethod, Product, SaleReceipt, TaxRate};
use till_db::{Database, DbConfig};

/// Catalog used for seeding: (sku, name, price in cents)
const CATALOG: &[(&str, &str, i64)] = &[
    ("BEV-COLA", "Coca-Cola 330ml", 199),
    ("BEV-WATER", "Dasani Water", 129),
    ("BEV-OJ", "Orange Juice", 349),
    ("SNK-LAYS", "Lays Classic", 279),
    ("SNK-OREO", "Oreos", 399),
    ("SNK-KITKAT", "Kit Kat", 149),
    ("DRY-MILK", "Whole Milk", 289),
    ("DRY-EGGS", "Eggs Dozen", 459),
    ("FRZ-PIZZA", "Frozen Pizza", 699),
    ("GRO-PASTA", "Pasta Penne", 189),
    ("GRO-RICE", "Rice White", 329),
    ("GRO-HONEY", "Honey", 749),
];

/// Tax rates in basis points
const TAX_RATES: &[u32] = &[0, 500, 825, 1000];

const CASHIERS: &[&str] = &["cashier-1", "cashier-2", "cashier-3"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of receipts to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Receipts: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Warehouse and catalog
    let warehouse = db.stock().create_warehouse("Main").await?;

    let mut products = Vec::with_capacity(CATALOG.len());
    for (idx, (sku, name, price_cents)) in CATALOG.iter().enumerate() {
        let tax = TaxRate::from_bps(TAX_RATES[idx % TAX_RATES.len()]);
        let product = Product::new(*sku, *name, Money::from_cents(*price_cents), tax);

        db.products().insert(&product).await?;
        db.stock().add_quantity(&product.id, &warehouse.id, 100).await?;
        products.push(product);
    }

    println!("✓ Created {} products in warehouse {}", products.len(), warehouse.id);

    // Receipts
    let mut generated = 0;
    for seed in 0..count {
        let receipt = generate_receipt(seed, &products)?;

        if let Err(e) = db.receipts().insert(&receipt).await {
            eprintln!("Failed to insert {}: {}", receipt.code, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} receipts...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} receipts in {:?}", generated, elapsed);
    println!();
    println!("Warehouse id: {}", warehouse.id);
    println!("Try: till receipt SEED-0000");
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one paid receipt with 1-4 items.
fn generate_receipt(
    seed: usize,
    products: &[Product],
) -> Result<SaleReceipt, Box<dyn std::error::Error>> {
    let cashier = OperatorId::new(CASHIERS[seed % CASHIERS.len()])?;
    let method = if seed % 3 == 0 {
        PaymentMethod::Card
    } else {
        PaymentMethod::Cash
    };

    // Spread over the last 30 days, newest receipt first
    let when = Utc::now() - Duration::minutes((seed * 97 % (30 * 24 * 60)) as i64);

    let mut receipt = SaleReceipt::new(format!("SEED-{:04}", seed), &cashier, method, when);

    let item_count = 1 + seed % 4;
    for n in 0..item_count {
        let product = &products[(seed * 7 + n * 5) % products.len()];
        let quantity = 1 + ((seed + n) % 3) as i64;
        let discount = if (seed + n) % 5 == 0 {
            Some(Money::from_cents(50))
        } else {
            None
        };
        receipt.add_item(product, product.price(), quantity, discount);
    }

    // Cash customers round up to the next dollar
    let total = receipt.total_cost();
    let paid = match method {
        PaymentMethod::Cash => Money::from_cents((total.cents() + 99) / 100 * 100),
        PaymentMethod::Card => total,
    };
    receipt.mark_paid(paid);

    Ok(receipt)
}
