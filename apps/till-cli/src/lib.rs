//! # Till CLI Library
//!
//! Argument definitions and command dispatch for the `till` binary.
//!
//! ## Module Organization
//! ```text
//! till_cli/
//! ├── lib.rs          ◄─── You are here (arguments, startup, dispatch)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shared output helpers
//! │   ├── register.rs ◄─── open, close, status
//! │   ├── ledger.rs   ◄─── record, records
//! │   ├── refund.rs   ◄─── receipt, quote, refund
//! │   └── report.rs   ◄─── report
//! └── error.rs        ◄─── CliError with codes and exit codes
//! ```
//!
//! ## Examples
//! ```bash
//! till open 100.00
//! till record income 50 "Float top-up"
//! till refund R-001 3f1c...:2 9a7e...:1 --warehouse main-wh
//! till report today
//! till report range 2026-10-01T00:00:00Z 2026-10-31T23:59:59Z
//! ```

pub mod commands;
pub mod error;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use error::CliError;
use till_core::{LedgerType, Money, OperatorId, RefundLine, ReportWindow};
use till_ledger::{Till, TillConfig};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug, Clone)]
#[command(name = "till", about = "Cash register and ledger", version)]
pub struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to till.toml", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Database file (overrides config)", global = true)]
    pub db: Option<PathBuf>,

    #[arg(long, value_name = "ID", help = "Operator performing the command", global = true)]
    pub operator: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the till. Without an amount, the last closing balance is used.
    Open { amount: Option<Money> },

    /// Close the open till.
    Close,

    /// Show the open till and the suggested opening balance.
    Status,

    /// Record a manual income, expense or refund posting.
    Record {
        #[arg(value_name = "TYPE")]
        kind: LedgerType,
        amount: Money,
        description: String,
    },

    /// List ledger postings in a window.
    Records {
        #[command(subcommand)]
        window: WindowArg,
    },

    /// Show a receipt with its items.
    Receipt { code: String },

    /// Price a refund basket without applying it.
    Quote {
        code: String,
        #[arg(value_name = "ITEM:QTY", required = true)]
        lines: Vec<RefundLine>,
    },

    /// Refund items from a receipt and return them to stock.
    Refund {
        code: String,
        #[arg(value_name = "ITEM:QTY", required = true)]
        lines: Vec<RefundLine>,
        #[arg(long, value_name = "ID", help = "Warehouse receiving the goods")]
        warehouse: Option<String>,
    },

    /// Categorized report with totals.
    Report {
        #[command(subcommand)]
        window: WindowArg,
    },
}

/// Report period as given on the command line.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowArg {
    /// Local midnight to end of today.
    Today,
    /// Current calendar month.
    Month,
    /// One local calendar day (YYYY-MM-DD).
    Day { date: NaiveDate },
    /// Inclusive RFC 3339 range.
    Range { from: DateTime<Utc>, to: DateTime<Utc> },
}

impl From<WindowArg> for ReportWindow {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Today => ReportWindow::Today,
            WindowArg::Month => ReportWindow::ThisMonth,
            WindowArg::Day { date } => ReportWindow::Day(date),
            WindowArg::Range { from, to } => ReportWindow::Range { from, to },
        }
    }
}

// =============================================================================
// Startup
// =============================================================================

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout carries only JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till_db=trace` - Trace the store only
/// - Default: `info,till=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub operator: OperatorId,
    pub default_warehouse: Option<String>,
}

impl Context {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn from_args(cli: &Cli, config: &TillConfig) -> Result<Self, CliError> {
        let operator = match &cli.operator {
            Some(id) => OperatorId::new(id.clone()).map_err(|e| CliError::validation(e.to_string()))?,
            None => config.operator()?,
        };

        Ok(Context {
            operator,
            default_warehouse: config.default_warehouse_id().map(str::to_string),
        })
    }
}

/// Loads configuration, connects and runs the command.
///
/// ## Startup Sequence
/// 1. Load `TillConfig` (defaults → file → environment)
/// 2. Apply `--db` / `--operator` overrides
/// 3. Connect to the database & run migrations
/// 4. Dispatch the command, print its JSON result
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = TillConfig::load(cli.config.clone())?;
    if let Some(ref path) = cli.db {
        config.database.path = path.clone();
    }

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::internal(format!("Cannot create data directory: {}", e)))?;
        }
    }

    let ctx = Context::from_args(&cli, &config)?;
    debug!(db_path = ?config.database.path, operator = %ctx.operator, "Till context resolved");

    let till = Till::connect(&config).await?;
    info!("Database connected and migrations applied");

    let result = execute(&till, &ctx, cli.command).await;
    till.database().close().await;

    print_json(&result?)
}

/// Runs one command against a connected till.
pub async fn execute(till: &Till, ctx: &Context, command: Command) -> Result<serde_json::Value, CliError> {
    let value = match command {
        Command::Open { amount } => to_value(commands::register::open(till, ctx, amount).await?)?,
        Command::Close => to_value(commands::register::close(till, ctx).await?)?,
        Command::Status => to_value(commands::register::status(till).await?)?,
        Command::Record {
            kind,
            amount,
            description,
        } => to_value(commands::ledger::record(till, ctx, kind, amount, &description).await?)?,
        Command::Records { window } => to_value(commands::ledger::records(till, window.into()).await?)?,
        Command::Receipt { code } => to_value(commands::refund::receipt(till, &code).await?)?,
        Command::Quote { code, lines } => to_value(commands::refund::quote(till, &code, &lines).await?)?,
        Command::Refund {
            code,
            lines,
            warehouse,
        } => to_value(commands::refund::refund(till, ctx, &code, warehouse.as_deref(), &lines).await?)?,
        Command::Report { window } => to_value(commands::report::report(till, window.into()).await?)?,
    };

    Ok(value)
}

fn to_value<T: Serialize>(value: T) -> Result<serde_json::Value, CliError> {
    Ok(serde_json::to_value(value)?)
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    write_json(&mut std::io::stdout().lock(), value)
}

/// Writes a value as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
