use crate::model::{RecentWindow, SummaryError, TickerSummary};

/// Summarizes one ticker's volume history against its recent window.
///
/// The window must leave at least one observation, i.e. the series needs
/// `-window.offset_start` items. A constant series has zero spread, so its
/// z-score comes out NaN or infinite and is returned as-is.
pub fn summarize(series: &[f64], window: RecentWindow) -> Result<TickerSummary, SummaryError> {
    if series.is_empty() {
        return Err(SummaryError::EmptySeries);
    }
    let recent = window.slice(series);
    if series.len() < window.required_len() || recent.is_empty() {
        return Err(SummaryError::InsufficientHistory {
            required: window.required_len().max(1),
            available: series.len(),
        });
    }

    let recent_window_mean = mean(recent);
    let mean_volume = mean(series);

    Ok(TickerSummary {
        percentile: percentile_rank(series, recent_window_mean),
        z_score: z_score(series, recent_window_mean),
        median_volume: median(series),
        mean_volume,
        recent_window_mean,
    })
}

/// Arithmetic mean of a non-empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor N).
pub fn std_dev(values: &[f64]) -> f64 {
    let avg = mean(values);
    (values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Standard score of `value` against the whole series.
pub fn z_score(series: &[f64], value: f64) -> f64 {
    (value - mean(series)) / std_dev(series)
}

/// Inclusive rank: share of observations `<= value`, in percent. Not interpolated.
pub fn percentile_rank(series: &[f64], value: f64) -> f64 {
    let at_or_below = series.iter().filter(|&&v| v <= value).count();
    100.0 * (at_or_below as f64 / series.len() as f64)
}
