// Console presentation of the ranked results
use crate::model::{FetchFailure, RankedResult};
use crate::utils::{format_decimal, format_thousands};
use tabled::settings::object::Segment;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};
use tracing::{info, warn};

#[derive(Debug, Tabled)]
struct ResultRow {
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Percentile")]
    percentile: String,
    #[tabled(rename = "Z-score")]
    z_score: String,
    #[tabled(rename = "PE Ratio")]
    pe_ratio: String,
    #[tabled(rename = "Industry")]
    industry: String,
    #[tabled(rename = "Median Volume")]
    median_volume: String,
    #[tabled(rename = "Arithmetic Mean")]
    mean_volume: String,
    #[tabled(rename = "Recent Window Mean")]
    recent_window_mean: String,
}

impl From<&RankedResult> for ResultRow {
    fn from(r: &RankedResult) -> Self {
        Self {
            ticker: r.ticker.clone(),
            percentile: format_decimal(r.percentile),
            z_score: format_decimal(r.z_score),
            pe_ratio: r.pe_ratio.map(format_decimal).unwrap_or_else(|| "N/A".to_string()),
            industry: r.industry.clone(),
            median_volume: format_thousands(r.median_volume),
            mean_volume: format_thousands(r.mean_volume),
            recent_window_mean: format_thousands(r.recent_window_mean),
        }
    }
}

/// Renders the results as a right-aligned table.
pub fn render_table(results: &[RankedResult]) -> String {
    if results.is_empty() {
        return "No tickers had usable volume data.".to_string();
    }
    let rows: Vec<ResultRow> = results.iter().map(ResultRow::from).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::ascii())
        .with(Modify::new(Segment::all()).with(Alignment::right()));
    table.to_string()
}

/// Logs a one-line tally of the per-ticker failures, then each one at debug level.
pub fn log_failures(failures: &[FetchFailure]) {
    if failures.is_empty() {
        info!("All fetches succeeded");
        return;
    }
    let acquisition = failures
        .iter()
        .filter(|f| matches!(f, FetchFailure::Acquisition { .. }))
        .count();
    let enrichment = failures.len() - acquisition;
    warn!(
        "{} volume fetches and {} fundamentals fetches failed",
        acquisition, enrichment
    );
    for failure in failures {
        tracing::debug!("{:?}", failure);
    }
}
