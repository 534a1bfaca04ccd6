use crate::config::AppConfig;
use crate::model::{Fundamentals, LookbackPeriod, ProviderError, VolumeSeries};
use crate::provider::traits::MarketDataProvider;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Yahoo Finance chart + quoteSummary client.
pub struct YahooProvider {
    client: Client,
    chart_url: String,
    summary_url: String,
    cookie_url: String,
    crumb_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            chart_url: config.yahoo_chart_url.trim_end_matches('/').to_string(),
            summary_url: config.yahoo_summary_url.trim_end_matches('/').to_string(),
            cookie_url: config.yahoo_cookie_url.clone(),
            crumb_url: config.yahoo_crumb_url.clone(),
            crumb: Mutex::new(None),
        })
    }

    fn build_chart_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.chart_url, ticker)
    }

    fn build_summary_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.summary_url, ticker)
    }

    /// quoteSummary needs a session cookie plus a matching crumb; both are fetched once.
    async fn crumb(&self) -> Result<String, ProviderError> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie endpoint answers 404 but still sets the session cookie.
        self.client.get(&self.cookie_url).send().await?;

        let response = self.client.get(&self.crumb_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: self.crumb_url.clone(),
            });
        }
        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.contains(' ') {
            return Err(ProviderError::Api(format!("invalid crumb {:?}", crumb)));
        }

        debug!("Obtained Yahoo crumb");
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.lock().await = None;
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_volumes(
        &self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<VolumeSeries, ProviderError> {
        let url = self.build_chart_url(ticker);
        let range = period.as_range();
        let response = self
            .client
            .get(&url)
            .query(&[("range", range.as_str()), ("interval", "1d"), ("includePrePost", "false")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error_from(&body).unwrap_or(ProviderError::Status {
                status: status.as_u16(),
                url,
            }));
        }

        parse_chart(&body)
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals, ProviderError> {
        let crumb = self.crumb().await?;
        let url = self.build_summary_url(ticker);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", "summaryDetail,assetProfile"), ("crumb", crumb.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            // Next caller starts a fresh session; this ticker is reported as failed.
            self.invalidate_crumb().await;
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error_from(&body).unwrap_or(ProviderError::Status {
                status: status.as_u16(),
                url,
            }));
        }

        parse_summary(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Envelope<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: Envelope<SummaryResult>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<Vec<T>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooError {
    fn into_provider_error(self) -> ProviderError {
        let code = self.code.unwrap_or_else(|| "Error".to_string());
        match self.description {
            Some(desc) => ProviderError::Api(format!("{}: {}", code, desc)),
            None => ProviderError::Api(code),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    #[serde(default)]
    industry: Option<String>,
}

/// Yahoo wraps numbers as `{ "raw": 12.3, "fmt": "12.30" }`.
/// Values JSON cannot hold arrive as strings, e.g. `{ "raw": "Infinity" }`.
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<serde_json::Value>,
}

impl RawValue {
    fn finite(&self) -> Option<f64> {
        let value = match self.raw.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }
}

fn api_error_from(body: &str) -> Option<ProviderError> {
    if let Ok(chart) = serde_json::from_str::<ChartResponse>(body) {
        return chart.chart.error.map(YahooError::into_provider_error);
    }
    if let Ok(summary) = serde_json::from_str::<SummaryResponse>(body) {
        return summary.quote_summary.error.map(YahooError::into_provider_error);
    }
    None
}

/// Extracts the daily volume column, oldest first, dropping missing rows.
pub fn parse_chart(body: &str) -> Result<VolumeSeries, ProviderError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    if let Some(error) = response.chart.error {
        return Err(error.into_provider_error());
    }

    let volumes: VolumeSeries = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.indicators)
        .and_then(|indicators| indicators.quote.into_iter().next())
        .map(|quote| quote.volume.into_iter().flatten().filter(|v| v.is_finite()).collect())
        .unwrap_or_default();

    Ok(volumes)
}

pub fn parse_summary(body: &str) -> Result<Fundamentals, ProviderError> {
    let response: SummaryResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    if let Some(error) = response.quote_summary.error {
        return Err(error.into_provider_error());
    }

    let result = response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::Parse("empty quoteSummary result".to_string()))?;

    Ok(Fundamentals {
        trailing_pe: result
            .summary_detail
            .and_then(|sd| sd.trailing_pe)
            .and_then(|pe| pe.finite()),
        industry: result.asset_profile.and_then(|ap| ap.industry),
    })
}
