// Ticker universe: where the list of symbols comes from.

pub mod csv_file;
pub mod wikipedia;

pub use csv_file::load_tickers_from_csv;
pub use wikipedia::fetch_sp500_tickers;

use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("failed to read ticker file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse listing: {0}")]
    Parse(String),
    #[error("no tickers found")]
    Empty,
}

/// Trims symbols, maps `.` to `-` (Yahoo's class-share notation), drops blanks
/// and duplicates while keeping the first occurrence.
pub fn normalize_tickers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.as_ref().trim().replace('.', "-"))
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
