//! Fetch → summarize → rank → enrich → merge.
//!
//! Every provider call is isolated per ticker: errors and timeouts become
//! [`FetchFailure`] events plus a placeholder value, never a batch abort.
//! Calls run concurrently, and results are re-keyed by ticker and put back
//! into input order so completion order cannot leak into the ranking.

use crate::analyzer::{rank, summarize};
use crate::config::FetchSettings;
use crate::model::{
    EnrichmentRecord, FetchFailure, LookbackPeriod, MergeError, ProviderError, RankedResult,
    RecentWindow, SummaryError, TickerSummary, VolumeSeries,
};
use crate::provider::MarketDataProvider;

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Everything the pipeline needs besides the provider.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub tickers: Vec<String>,
    pub period: LookbackPeriod,
    pub window: RecentWindow,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub results: Vec<RankedResult>,
    pub failures: Vec<FetchFailure>,
    /// Tickers that produced a summary (before truncation to `count`).
    pub analyzed: usize,
}

/// Runs the whole pipeline for one request.
pub async fn run<P>(
    provider: &P,
    request: &AnalysisRequest,
    settings: FetchSettings,
) -> Result<AnalysisReport, MergeError>
where
    P: MarketDataProvider + ?Sized,
{
    info!(
        "Analyzing {} tickers over {} against {}",
        request.tickers.len(),
        request.period,
        request.window
    );

    let (volume_data, mut failures) =
        fetch_volume_data(provider, &request.tickers, request.period, settings).await;

    let summaries = analyze_volumes(&volume_data, request.window);
    let analyzed = summaries.len();
    info!("{} of {} tickers have usable volume data", analyzed, request.tickers.len());

    let ranked = rank(summaries, request.count);
    let ranked_tickers: Vec<String> = ranked.iter().map(|(t, _)| t.clone()).collect();

    let (enrichment, enrichment_failures) =
        fetch_enrichment(provider, &ranked_tickers, settings).await;
    failures.extend(enrichment_failures);

    let results = merge_results(ranked, enrichment)?;
    Ok(AnalysisReport {
        results,
        failures,
        analyzed,
    })
}

/// Fetches every ticker's volume history. Failed tickers get an empty series.
pub async fn fetch_volume_data<P>(
    provider: &P,
    tickers: &[String],
    period: LookbackPeriod,
    settings: FetchSettings,
) -> (Vec<(String, VolumeSeries)>, Vec<FetchFailure>)
where
    P: MarketDataProvider + ?Sized,
{
    info!("Fetching volume data for {} tickers...", tickers.len());
    let mut fetched = fan_out(tickers, settings, move |ticker| async move {
        provider.fetch_volumes(ticker, period).await
    })
    .await;

    let mut failures = Vec::new();
    let mut volume_data = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let series = match fetched.remove(ticker) {
            Some(Ok(series)) => series,
            Some(Err(e)) => {
                warn!("An error occurred for {}: {}", ticker, e);
                failures.push(FetchFailure::Acquisition {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                VolumeSeries::new()
            }
            // Duplicate ticker: its single result was already consumed.
            None => continue,
        };
        volume_data.push((ticker.clone(), series));
    }
    (volume_data, failures)
}

/// Summarizes every non-empty series in order; empty and too-short series are skipped.
pub fn analyze_volumes(
    volume_data: &[(String, VolumeSeries)],
    window: RecentWindow,
) -> Vec<(String, TickerSummary)> {
    volume_data
        .iter()
        .filter_map(|(ticker, series)| match summarize(series, window) {
            Ok(summary) => Some((ticker.clone(), summary)),
            Err(SummaryError::EmptySeries) => {
                debug!("No volume data for {}, skipping", ticker);
                None
            }
            Err(e) => {
                warn!("Skipping {}: {}", ticker, e);
                None
            }
        })
        .collect()
}

/// Fetches P/E and industry for the ranked subset. Every ticker gets a record.
pub async fn fetch_enrichment<P>(
    provider: &P,
    tickers: &[String],
    settings: FetchSettings,
) -> (HashMap<String, EnrichmentRecord>, Vec<FetchFailure>)
where
    P: MarketDataProvider + ?Sized,
{
    info!("Fetching P/E & industry for {} tickers...", tickers.len());
    let fetched = fan_out(tickers, settings, move |ticker| async move {
        provider.fetch_fundamentals(ticker).await
    })
    .await;

    let mut failures = Vec::new();
    let enrichment = fetched
        .into_iter()
        .map(|(ticker, result)| {
            let record = match result {
                Ok(fundamentals) => EnrichmentRecord::from(fundamentals),
                Err(e) => {
                    warn!("An error occurred fetching additional data for {}: {}", ticker, e);
                    failures.push(FetchFailure::Enrichment {
                        ticker: ticker.clone(),
                        reason: e.to_string(),
                    });
                    EnrichmentRecord::error()
                }
            };
            (ticker, record)
        })
        .collect();

    // Map iteration order is arbitrary; report failures in input order.
    failures.sort_by_key(|f: &FetchFailure| tickers.iter().position(|t| t == f.ticker()));
    (enrichment, failures)
}

/// Attaches enrichment to each ranked ticker, keeping the ranked order.
pub fn merge_results(
    ranked: Vec<(String, TickerSummary)>,
    mut enrichment: HashMap<String, EnrichmentRecord>,
) -> Result<Vec<RankedResult>, MergeError> {
    ranked
        .into_iter()
        .map(|(ticker, summary)| {
            let record = enrichment
                .remove(&ticker)
                .ok_or_else(|| MergeError::MissingEnrichment(ticker.clone()))?;
            Ok(RankedResult::new(ticker, summary, record))
        })
        .collect()
}

/// Runs `call` once per distinct ticker with bounded concurrency and a per-call
/// timeout, collecting results keyed by ticker.
async fn fan_out<'a, T, F, Fut>(
    tickers: &'a [String],
    settings: FetchSettings,
    call: F,
) -> HashMap<String, Result<T, ProviderError>>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>> + 'a,
{
    let mut seen = std::collections::HashSet::new();
    let distinct: Vec<&'a String> = tickers.iter().filter(|t| seen.insert(t.as_str())).collect();

    stream::iter(distinct)
        .map(|ticker| {
            let fut = call(ticker.as_str());
            async move {
                let result = match timeout(settings.timeout, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(settings.timeout)),
                };
                (ticker.clone(), result)
            }
        })
        .buffer_unordered(settings.max_concurrent.max(1))
        .collect()
        .await
}
