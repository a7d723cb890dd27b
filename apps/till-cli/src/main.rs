//! # Till CLI Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             till <command>                              │
//! │                                                                         │
//! │  main.rs ────► tracing to stderr, parse arguments                       │
//! │  lib.rs  ────► load config, connect, dispatch                           │
//! │  commands/ ──► one till-ledger call per command                         │
//! │                                                                         │
//! │  stdout: JSON result, or {"code", "message"} on failure                 │
//! │  exit:   0 on success, CliError::exit_code() otherwise                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use till_cli::{init_tracing, print_json, run, Cli};

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::warn!(code = ?err.code, "{}", err.message);
        if let Err(write_err) = print_json(&err) {
            tracing::error!(error = %write_err, "Failed to write error response");
        }
        std::process::exit(err.exit_code());
    }
}
