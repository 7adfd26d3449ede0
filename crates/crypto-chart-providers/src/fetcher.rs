use crypto_chart_core::range::DateRange;
use crypto_chart_core::table::OhlcTable;
use tracing::info;

use crate::error::FetchError;
use crate::provider::DailyBarProvider;

/// Fetch daily history for `symbol` as a table.
///
/// A single request is made. An empty table is reported as
/// [`FetchError::EmptyResult`] so callers only ever see data or an error.
pub async fn fetch(
    provider: &dyn DailyBarProvider,
    symbol: &str,
    range: &DateRange,
) -> Result<OhlcTable, FetchError> {
    info!(
        "{symbol}: fetching daily bars from {} to {} via {}",
        range.start,
        range.end,
        provider.name()
    );

    let bars = provider.fetch_daily_bars(symbol, range).await?;
    let table = OhlcTable::from_bars(bars);

    if table.is_empty() {
        return Err(FetchError::EmptyResult {
            symbol: symbol.to_string(),
        });
    }

    info!("{symbol}: received {} daily bar(s)", table.len());
    Ok(table)
}
