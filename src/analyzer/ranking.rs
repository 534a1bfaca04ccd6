use crate::model::TickerSummary;

/// Distance of a percentile from the nearest tail: 0 is most extreme, 50 least.
pub fn extremity(percentile: f64) -> f64 {
    percentile.min(100.0 - percentile)
}

/// Orders tickers by extremity of their volume percentile and keeps the first `count`.
///
/// The sort is stable, so tickers with equal keys keep their input order
/// (first seen wins). `count` is not validated here.
pub fn rank(
    mut summaries: Vec<(String, TickerSummary)>,
    count: usize,
) -> Vec<(String, TickerSummary)> {
    summaries.sort_by(|(_, a), (_, b)| extremity(a.percentile).total_cmp(&extremity(b.percentile)));
    summaries.truncate(count);
    summaries
}
