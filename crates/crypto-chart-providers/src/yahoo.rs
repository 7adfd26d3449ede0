use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use crypto_chart_core::candle::DailyBar;
use crypto_chart_core::range::DateRange;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::provider::DailyBarProvider;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart API. No authentication required.
/// Covers crypto pairs (`BTC-USD`), equities and indices with years of daily history.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_URL.to_string())
    }

    /// Create with a custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0")
                .build()
                .expect("failed to build reqwest client"),
            base_url,
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: Option<YahooMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

fn f64_to_decimal(val: f64) -> Result<Decimal, FetchError> {
    Decimal::try_from(val).map_err(|e| FetchError::Parse(format!("invalid decimal value: {e}")))
}

/// Time zone the exchange reports its sessions in; bars are dated in it.
fn exchange_timezone(result: &YahooResult) -> Tz {
    result
        .meta
        .as_ref()
        .and_then(|m| m.exchange_timezone_name.as_deref())
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}

fn bar_date(ts: i64, tz: Tz) -> Result<NaiveDate, FetchError> {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&tz).date_naive())
        .ok_or_else(|| FetchError::Parse(format!("invalid unix timestamp: {ts}")))
}

fn parse_yahoo_result(result: &YahooResult) -> Result<Vec<DailyBar>, FetchError> {
    // no timestamps at all means the range held no sessions
    let Some(timestamps) = result.timestamp.as_ref() else {
        return Ok(Vec::new());
    };

    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let tz = exchange_timezone(result);
    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let price = |series: &[Option<f64>]| series.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            price(&quote.open),
            price(&quote.high),
            price(&quote.low),
            price(&quote.close),
        ) else {
            continue; // skip bars with missing data
        };

        bars.push(DailyBar {
            date: bar_date(ts, tz)?,
            open: f64_to_decimal(open)?,
            high: f64_to_decimal(high)?,
            low: f64_to_decimal(low)?,
            close: f64_to_decimal(close)?,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    Ok(bars)
}

#[async_trait]
impl DailyBarProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<DailyBar>, FetchError> {
        debug!(
            "GET {}/{symbol} from {} to {} (exclusive)",
            self.base_url, range.start, range.end
        );

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, symbol))
            .query(&[
                ("period1", range.start_timestamp().to_string()),
                ("period2", range.end_timestamp().to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(FetchError::RateLimited {
                    retry_after_secs: retry_after_secs(response.headers()),
                });
            }
            // unknown symbols come back as 404
            StatusCode::NOT_FOUND => {
                return Err(FetchError::EmptyResult {
                    symbol: symbol.to_string(),
                });
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }
            _ => {}
        }

        let body = response.text().await?;
        parse_chart_body(symbol, &body)
    }
}

/// Seconds from a `Retry-After` header; HTTP-date forms are ignored.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Decode a chart API body into daily bars sorted by date.
fn parse_chart_body(symbol: &str, body: &str) -> Result<Vec<DailyBar>, FetchError> {
    let response: YahooResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("failed to parse response: {e}")))?;

    if let Some(error) = response.chart.error {
        if error.code == "Not Found" {
            return Err(FetchError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }
        return Err(FetchError::Api {
            status: 0,
            message: format!("{}: {}", error.code, error.description),
        });
    }

    let results = response
        .chart
        .result
        .ok_or_else(|| FetchError::Parse("no results in response".into()))?;

    let Some(first) = results.first() else {
        return Ok(Vec::new());
    };

    let mut bars = parse_yahoo_result(first)?;
    bars.sort_by_key(|b| b.date);
    debug!("{symbol}: decoded {} daily bar(s)", bars.len());
    Ok(bars)
}
