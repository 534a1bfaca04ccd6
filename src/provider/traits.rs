use crate::model::{Fundamentals, LookbackPeriod, ProviderError, VolumeSeries};

/// Source of daily volume history and fundamentals for a single ticker.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_volumes(
        &self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<VolumeSeries, ProviderError>;

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals, ProviderError>;
}
