// Core structs: VolumeSeries, RecentWindow, TickerSummary, EnrichmentRecord, RankedResult
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Daily traded volumes for one ticker, oldest first.
pub type VolumeSeries = Vec<f64>;

/// Half-open slice `[offset_start, offset_end)` counted from the end of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentWindow {
    pub offset_start: isize,
    pub offset_end: isize,
}

impl RecentWindow {
    pub const YESTERDAY: RecentWindow = RecentWindow::new(-2, -1);
    pub const LAST_THREE_DAYS: RecentWindow = RecentWindow::new(-4, -1);
    pub const LAST_FIVE_DAYS: RecentWindow = RecentWindow::new(-6, -1);

    pub const fn new(offset_start: isize, offset_end: isize) -> Self {
        Self {
            offset_start,
            offset_end,
        }
    }

    /// Minimum number of observations needed for the slice to be non-empty.
    pub fn required_len(&self) -> usize {
        self.offset_start.unsigned_abs()
    }

    /// Resolves the offsets against a series of `len` items, clamping like a Python slice.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let resolve = |offset: isize| -> usize {
            if offset < 0 {
                len.saturating_sub(offset.unsigned_abs())
            } else {
                (offset as usize).min(len)
            }
        };
        let start = resolve(self.offset_start);
        let end = resolve(self.offset_end);
        (start, end.max(start))
    }

    pub fn slice<'a>(&self, series: &'a [f64]) -> &'a [f64] {
        let (start, end) = self.bounds(series.len());
        &series[start..end]
    }

    pub fn description(&self) -> String {
        match *self {
            Self::YESTERDAY => "yesterday".to_string(),
            Self::LAST_THREE_DAYS => "last three days".to_string(),
            Self::LAST_FIVE_DAYS => "last five days".to_string(),
            other => format!("[{}, {})", other.offset_start, other.offset_end),
        }
    }
}

impl fmt::Display for RecentWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Historical lookback passed to the market data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackPeriod {
    Months(u8),
    Years(u8),
    Max,
}

impl LookbackPeriod {
    pub fn as_range(&self) -> String {
        match self {
            Self::Months(n) => format!("{}mo", n),
            Self::Years(n) => format!("{}y", n),
            Self::Max => "max".to_string(),
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_range())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerSource {
    Sp500,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerSummary {
    pub percentile: f64,
    pub z_score: f64,
    pub median_volume: f64,
    pub mean_volume: f64,
    pub recent_window_mean: f64,
}

/// Fundamentals as reported by the provider, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fundamentals {
    pub trailing_pe: Option<f64>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRecord {
    pub pe_ratio: Option<f64>,
    pub industry: String,
}

impl EnrichmentRecord {
    pub const UNKNOWN_INDUSTRY: &'static str = "Unknown";
    pub const ERROR_INDUSTRY: &'static str = "Error";

    /// Placeholder used when the fundamentals fetch itself failed.
    pub fn error() -> Self {
        Self {
            pe_ratio: None,
            industry: Self::ERROR_INDUSTRY.to_string(),
        }
    }
}

impl From<Fundamentals> for EnrichmentRecord {
    fn from(f: Fundamentals) -> Self {
        Self {
            pe_ratio: f.trailing_pe.filter(|pe| pe.is_finite()),
            industry: f
                .industry
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| Self::UNKNOWN_INDUSTRY.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub ticker: String,
    pub percentile: f64,
    pub z_score: f64,
    pub pe_ratio: Option<f64>,
    pub industry: String,
    pub median_volume: f64,
    pub mean_volume: f64,
    pub recent_window_mean: f64,
}

impl RankedResult {
    pub fn new(ticker: String, summary: TickerSummary, enrichment: EnrichmentRecord) -> Self {
        Self {
            ticker,
            percentile: summary.percentile,
            z_score: summary.z_score,
            pe_ratio: enrichment.pe_ratio,
            industry: enrichment.industry,
            median_volume: summary.median_volume,
            mean_volume: summary.mean_volume,
            recent_window_mean: summary.recent_window_mean,
        }
    }
}

/// Per-ticker failure reported by the orchestration instead of printing inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Acquisition { ticker: String, reason: String },
    Enrichment { ticker: String, reason: String },
}

impl FetchFailure {
    pub fn ticker(&self) -> &str {
        match self {
            Self::Acquisition { ticker, .. } | Self::Enrichment { ticker, .. } => ticker,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("provider error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error, PartialEq)]
pub enum SummaryError {
    #[error("volume series is empty")]
    EmptySeries,
    #[error("need at least {required} observations, got {available}")]
    InsufficientHistory { required: usize, available: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("no enrichment record for ranked ticker {0}")]
    MissingEnrichment(String),
}
