//! # Report Command

use serde::Serialize;
use tracing::debug;

use crate::error::CliError;
use till_core::{PeriodReport, ReportTotals, ReportWindow};
use till_ledger::Till;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: PeriodReport,
    pub totals: ReportTotals,
}

/// `till report <WINDOW>`
pub async fn report(till: &Till, window: ReportWindow) -> Result<ReportResponse, CliError> {
    debug!(?window, "report command");

    let report = till.reports().report_for(window).await?;
    let totals = report.totals();

    Ok(ReportResponse { report, totals })
}
