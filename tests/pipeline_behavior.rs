use async_trait::async_trait;
use momentum_sniper::config::FetchSettings;
use momentum_sniper::model::{
    FetchFailure, Fundamentals, LookbackPeriod, ProviderError, RecentWindow, VolumeSeries,
};
use momentum_sniper::pipeline::{self, AnalysisRequest};
use momentum_sniper::provider::MarketDataProvider;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory provider: unknown tickers fail, `slow` tickers sleep past the timeout.
#[derive(Default)]
struct FakeProvider {
    volumes: HashMap<String, VolumeSeries>,
    fundamentals: HashMap<String, Fundamentals>,
    slow: Vec<String>,
    volume_calls: Mutex<Vec<String>>,
    fundamentals_calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn with_volumes(mut self, ticker: &str, series: &[f64]) -> Self {
        self.volumes.insert(ticker.to_string(), series.to_vec());
        self
    }

    fn with_fundamentals(mut self, ticker: &str, pe: Option<f64>, industry: Option<&str>) -> Self {
        self.fundamentals.insert(
            ticker.to_string(),
            Fundamentals {
                trailing_pe: pe,
                industry: industry.map(str::to_string),
            },
        );
        self
    }

    fn with_slow(mut self, ticker: &str) -> Self {
        self.slow.push(ticker.to_string());
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn fetch_volumes(
        &self,
        ticker: &str,
        _period: LookbackPeriod,
    ) -> Result<VolumeSeries, ProviderError> {
        self.volume_calls.lock().unwrap().push(ticker.to_string());
        if self.slow.iter().any(|t| t == ticker) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        self.volumes
            .get(ticker)
            .cloned()
            .ok_or_else(|| ProviderError::Api(format!("No data found for {}", ticker)))
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals, ProviderError> {
        self.fundamentals_calls.lock().unwrap().push(ticker.to_string());
        self.fundamentals
            .get(ticker)
            .cloned()
            .ok_or_else(|| ProviderError::Status {
                status: 404,
                url: format!("fake://{}", ticker),
            })
    }
}

fn settings() -> FetchSettings {
    FetchSettings {
        timeout: Duration::from_millis(200),
        max_concurrent: 4,
    }
}

fn request(tickers: &[&str], count: usize) -> AnalysisRequest {
    AnalysisRequest {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        period: LookbackPeriod::Years(1),
        window: RecentWindow::YESTERDAY,
        count,
    }
}

// Series whose second-to-last value sits at a chosen spot in the history.
const SPIKE: [f64; 6] = [10.0, 20.0, 30.0, 40.0, 99.0, 15.0]; // percentile 100
const QUIET: [f64; 6] = [50.0, 60.0, 70.0, 80.0, 1.0, 55.0]; // percentile 16.67
const MIDDLE: [f64; 6] = [10.0, 20.0, 30.0, 40.0, 25.0, 50.0]; // percentile 50

#[tokio::test]
async fn ranks_enriches_and_merges_in_extremity_order() {
    let provider = FakeProvider::default()
        .with_volumes("MID", &MIDDLE)
        .with_volumes("QUIET", &QUIET)
        .with_volumes("SPIKE", &SPIKE)
        .with_fundamentals("SPIKE", Some(31.2), Some("Semiconductors"))
        .with_fundamentals("QUIET", None, None)
        .with_fundamentals("MID", Some(12.0), Some("Banks"));

    let report = pipeline::run(&provider, &request(&["MID", "QUIET", "SPIKE"], 2), settings())
        .await
        .unwrap();

    let tickers: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["SPIKE", "QUIET"]);
    assert_eq!(report.analyzed, 3);
    assert!(report.failures.is_empty());

    let spike = &report.results[0];
    assert_eq!(spike.percentile, 100.0);
    assert_eq!(spike.recent_window_mean, 99.0);
    assert_eq!(spike.pe_ratio, Some(31.2));
    assert_eq!(spike.industry, "Semiconductors");

    let quiet = &report.results[1];
    assert_eq!(quiet.pe_ratio, None);
    assert_eq!(quiet.industry, "Unknown");

    // Only the ranked subset is enriched.
    let mut enriched = provider.fundamentals_calls.lock().unwrap().clone();
    enriched.sort();
    assert_eq!(enriched, vec!["QUIET", "SPIKE"]);
}

#[tokio::test]
async fn acquisition_failures_are_isolated() {
    let provider = FakeProvider::default()
        .with_volumes("GOOD", &SPIKE)
        .with_volumes("EMPTY", &[])
        .with_fundamentals("GOOD", Some(20.0), Some("Software"));

    let report = pipeline::run(&provider, &request(&["BAD", "EMPTY", "GOOD"], 5), settings())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].ticker, "GOOD");
    assert_eq!(report.analyzed, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        FetchFailure::Acquisition { ticker, reason } if ticker == "BAD" && reason.contains("No data")
    ));
}

#[tokio::test]
async fn enrichment_failure_yields_error_placeholder() {
    let provider = FakeProvider::default()
        .with_volumes("AAA", &SPIKE)
        .with_volumes("BBB", &QUIET);

    let report = pipeline::run(&provider, &request(&["AAA", "BBB"], 2), settings())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        assert_eq!(result.pe_ratio, None);
        assert_eq!(result.industry, "Error");
    }
    let failed: Vec<&str> = report.failures.iter().map(|f| f.ticker()).collect();
    assert_eq!(failed, vec!["AAA", "BBB"]);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f, FetchFailure::Enrichment { .. })));
}

#[tokio::test]
async fn slow_fetch_times_out_without_blocking_batch() {
    let provider = FakeProvider::default()
        .with_volumes("FAST", &SPIKE)
        .with_volumes("SLOW", &QUIET)
        .with_slow("SLOW");

    let (volumes, failures) = pipeline::fetch_volume_data(
        &provider,
        &["SLOW".to_string(), "FAST".to_string()],
        LookbackPeriod::Max,
        settings(),
    )
    .await;

    assert_eq!(volumes.len(), 2);
    assert_eq!(volumes[0].0, "SLOW");
    assert!(volumes[0].1.is_empty());
    assert_eq!(volumes[1].1, SPIKE.to_vec());
    assert!(matches!(
        &failures[..],
        [FetchFailure::Acquisition { ticker, reason }] if ticker == "SLOW" && reason.contains("timed out")
    ));
}

#[tokio::test]
async fn results_follow_input_order_regardless_of_completion() {
    let mut provider = FakeProvider::default();
    let tickers: Vec<String> = (0..20).map(|i| format!("T{:02}", i)).collect();
    for t in &tickers {
        provider = provider.with_volumes(t, &MIDDLE);
    }

    let (volumes, failures) =
        pipeline::fetch_volume_data(&provider, &tickers, LookbackPeriod::Years(2), settings()).await;
    assert!(failures.is_empty());
    let order: Vec<&String> = volumes.iter().map(|(t, _)| t).collect();
    assert_eq!(order, tickers.iter().collect::<Vec<_>>());

    // Every summary ties at percentile 50, so the ranking must keep input order.
    let summaries = pipeline::analyze_volumes(&volumes, RecentWindow::YESTERDAY);
    let ranked = momentum_sniper::analyzer::rank(summaries, 3);
    let top: Vec<&str> = ranked.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(top, vec!["T00", "T01", "T02"]);
}

#[tokio::test]
async fn duplicate_tickers_are_fetched_once() {
    let provider = FakeProvider::default().with_volumes("DUP", &SPIKE);
    let (volumes, _) = pipeline::fetch_volume_data(
        &provider,
        &["DUP".to_string(), "DUP".to_string()],
        LookbackPeriod::Months(6),
        settings(),
    )
    .await;

    assert_eq!(volumes.len(), 1);
    assert_eq!(provider.volume_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_universe_gives_empty_report() {
    let provider = FakeProvider::default();
    let report = pipeline::run(&provider, &request(&[], 3), settings()).await.unwrap();
    assert!(report.results.is_empty());
    assert!(report.failures.is_empty());
    assert_eq!(report.analyzed, 0);
}
