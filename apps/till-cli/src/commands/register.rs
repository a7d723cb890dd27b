//! # Register Commands

use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use crate::Context;
use till_core::{CashRegister, Money};
use till_ledger::Till;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// The open register, if any.
    pub open: Option<CashRegister>,
    /// Balance `open` would start from without an explicit amount.
    pub suggested_opening_balance: Money,
}

/// `till open [AMOUNT]`
pub async fn open(till: &Till, ctx: &Context, amount: Option<Money>) -> Result<CashRegister, CliError> {
    let registers = till.registers();

    let amount = match amount {
        Some(amount) => amount,
        None => registers.suggested_opening_balance().await?,
    };
    debug!(amount = %amount, "open command");

    Ok(registers.open(&ctx.operator, amount).await?)
}

/// `till close`
pub async fn close(till: &Till, ctx: &Context) -> Result<CashRegister, CliError> {
    debug!("close command");
    Ok(till.registers().close(&ctx.operator).await?)
}

/// `till status`
pub async fn status(till: &Till) -> Result<StatusResponse, CliError> {
    let registers = till.registers();

    Ok(StatusResponse {
        open: registers.current_open().await?,
        suggested_opening_balance: registers.suggested_opening_balance().await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, till};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_open_defaults_to_last_closing_balance() {
        let till = till().await;
        let ctx = context(None);

        let first = open(&till, &ctx, Some(Money::from_cents(4_200))).await.unwrap();
        assert_eq!(first.total_balance(), Money::from_cents(4_200));
        close(&till, &ctx).await.unwrap();

        let second = open(&till, &ctx, None).await.unwrap();
        assert_eq!(second.opening_balance(), Money::from_cents(4_200));
    }

    #[tokio::test]
    async fn test_status_and_errors() {
        let till = till().await;
        let ctx = context(None);

        let before = status(&till).await.unwrap();
        assert!(before.open.is_none());
        assert_eq!(before.suggested_opening_balance, Money::zero());

        let err = close(&till, &ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoOpenRegister);

        open(&till, &ctx, None).await.unwrap();
        let err = open(&till, &ctx, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RegisterAlreadyOpen);

        let json = serde_json::to_value(status(&till).await.unwrap()).unwrap();
        assert_eq!(json["open"]["status"], "open");
    }
}
