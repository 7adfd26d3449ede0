use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No data found for {symbol} in the specified date range.")]
    EmptyResult { symbol: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    /// `retry_after_secs` is the provider's `Retry-After` hint, when it sent one.
    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}
