use async_trait::async_trait;
use crypto_chart_core::candle::DailyBar;
use crypto_chart_core::range::DateRange;

use crate::error::FetchError;

/// Source of daily OHLCV history.
#[async_trait]
pub trait DailyBarProvider: Send + Sync {
    /// Provider name (for logging/display).
    fn name(&self) -> &str;

    /// Fetch daily bars for `symbol` over `range` (end date excluded).
    /// Returns an empty vec when the provider has nothing for the range.
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyBar>, FetchError>;
}
