// Wikipedia S&P 500 constituents parsing
use crate::universe::{normalize_tickers, UniverseError};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::info;

/// Downloads the constituents page and returns the normalized symbols.
pub async fn fetch_sp500_tickers(client: &Client, url: &str) -> Result<Vec<String>, UniverseError> {
    info!("Fetching S&P 500 constituents from {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UniverseError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let html = response.text().await?;
    let tickers = parse_constituents(&html)?;
    info!("Loaded {} tickers from Wikipedia", tickers.len());
    Ok(tickers)
}

/// Reads the first cell of every body row of the constituents table.
pub fn parse_constituents(html: &str) -> Result<Vec<String>, UniverseError> {
    let document = Html::parse_document(html);

    let table_selector = Selector::parse("table#constituents, table.wikitable")
        .map_err(|e| UniverseError::Parse(e.to_string()))?;
    let row_selector =
        Selector::parse("tr").map_err(|e| UniverseError::Parse(e.to_string()))?;
    let cell_selector =
        Selector::parse("td").map_err(|e| UniverseError::Parse(e.to_string()))?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| UniverseError::Parse("constituents table not found".to_string()))?;

    let symbols = table.select(&row_selector).filter_map(|row| {
        row.select(&cell_selector)
            .next()
            .map(|cell| cell.text().collect::<String>())
    });

    let tickers = normalize_tickers(symbols);
    if tickers.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(tickers)
}
