use crate::universe::{normalize_tickers, UniverseError};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Loads tickers from the first column of a header-less CSV file.
pub fn load_tickers_from_csv(path: impl AsRef<Path>) -> Result<Vec<String>, UniverseError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut raw = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                if let Some(first) = record.get(0) {
                    raw.push(first.to_string());
                }
            }
            Err(e) => warn!("Skipping line {} of {}: {}", idx + 1, path.display(), e),
        }
    }

    let tickers = normalize_tickers(raw);
    if tickers.is_empty() {
        return Err(UniverseError::Empty);
    }
    info!("Loaded {} tickers from {}", tickers.len(), path.display());
    Ok(tickers)
}
