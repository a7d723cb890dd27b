//! # Repository Module
//!
//! Database repository implementations for the till.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Pool reads (struct methods)           Transactional writes (fns)      │
//! │  ───────────────────────────           ───────────────────────────      │
//! │  db.registers().last_closed()          register::fetch_open(&mut tx)   │
//! │  db.ledger().for_period(from, to)      register::insert(&mut tx, ..)   │
//! │  db.receipts().get_by_code(code)       register::apply_balance_delta   │
//! │  db.receipts().for_period(from, to)    ledger::insert(&mut tx, ..)     │
//! │  db.stock().get(product, warehouse)    receipt::mark_refunded(..)      │
//! │                                        stock::add_quantity(..)         │
//! │                                                                         │
//! │  SQL lives only here. Callers never see a query string.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`RegisterRepository`](register::RegisterRepository) - Cash register lifecycle
//! - [`LedgerRepository`](ledger::LedgerRepository) - Append-only postings
//! - [`ReceiptRepository`](receipt::ReceiptRepository) - Sale receipts and items
//! - [`ProductRepository`](product::ProductRepository) - Catalog slice
//! - [`StockRepository`](stock::StockRepository) - Warehouses and stock levels

pub mod ledger;
pub mod product;
pub mod receipt;
pub mod register;
pub mod stock;
