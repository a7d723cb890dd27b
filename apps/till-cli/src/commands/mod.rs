//! # CLI Commands
//!
//! One function per subcommand. Each takes the connected [`Till`], calls a
//! single service and returns a serializable response.
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here
//! ├── register.rs ◄─── open, close, status
//! ├── ledger.rs   ◄─── record, records
//! ├── refund.rs   ◄─── receipt, quote, refund
//! └── report.rs   ◄─── report
//! ```
//!
//! [`Till`]: till_ledger::Till

pub mod ledger;
pub mod refund;
pub mod register;
pub mod report;
