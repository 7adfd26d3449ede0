use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crypto_chart_core::indicators::DEFAULT_MA_WINDOW;
use crypto_chart_core::range::{DEFAULT_START, DateRange};
use crypto_chart_core::table::OhlcTable;
use crypto_chart_providers::fetcher;
use crypto_chart_providers::provider::DailyBarProvider;
use crypto_chart_providers::yahoo::YahooProvider;
use crypto_chart_render::renderer::{self, RenderOptions};
use tracing::{debug, info};

const DEFAULT_SYMBOL: &str = "BTC-USD";

#[derive(Parser)]
#[command(
    name = "crypto-chart",
    about = "Chart daily prices with a moving average"
)]
struct Cli {
    /// Instrument symbol as the provider knows it
    #[arg(short, long, default_value = DEFAULT_SYMBOL)]
    symbol: String,

    /// First day to fetch (YYYY-MM-DD)
    #[arg(long, default_value_t = DEFAULT_START)]
    start: NaiveDate,

    /// Day to stop at, not included (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Moving-average window in days
    #[arg(long, default_value_t = DEFAULT_MA_WINDOW)]
    window: usize,

    /// Where to write the SVG chart (defaults to the temp directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the chart without opening a viewer
    #[arg(long)]
    no_open: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunConfig {
    symbol: String,
    range: DateRange,
    render: RenderOptions,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            range: DateRange::ending_today(self.start, self.end),
            render: RenderOptions {
                window: self.window,
                output: self.output,
                open_viewer: !self.no_open,
                ..RenderOptions::default()
            },
            symbol: self.symbol,
        }
    }
}

/// Fetch step with every failure reduced to a diagnostic line on `out`.
async fn fetch_or_report(
    provider: &dyn DailyBarProvider,
    symbol: &str,
    range: &DateRange,
    out: &mut impl Write,
) -> io::Result<Option<OhlcTable>> {
    match fetcher::fetch(provider, symbol, range).await {
        Ok(table) => Ok(Some(table)),
        Err(e) => {
            debug!("{symbol}: fetch failed: {e:?}");
            writeln!(out, "Error fetching data: {e}")?;
            Ok(None)
        }
    }
}

/// Fetch, then chart if anything came back. Returns the chart path when one was drawn.
async fn run(
    provider: &dyn DailyBarProvider,
    config: &RunConfig,
    out: &mut impl Write,
) -> Result<Option<PathBuf>> {
    let fetched = fetch_or_report(provider, &config.symbol, &config.range, out)
        .await
        .context("failed to write diagnostic")?;
    let Some(table) = fetched else {
        return Ok(None);
    };

    renderer::render(Some(&table), &config.symbol, &config.render, out)
        .with_context(|| format!("failed to render chart for {}", config.symbol))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.into_config();
    let provider = YahooProvider::new();
    info!("Using provider: {}", provider.name());

    if let Some(path) = run(&provider, &config, &mut io::stdout().lock()).await? {
        info!("{}: done, chart at {}", config.symbol, path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Days, Local};
    use crypto_chart_core::candle::DailyBar;
    use crypto_chart_providers::error::FetchError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Serves one bar per day in the requested range, or nothing for unknown symbols.
    struct StubProvider {
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DailyBarProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch_daily_bars(
            &self,
            symbol: &str,
            range: &DateRange,
        ) -> Result<Vec<DailyBar>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match symbol {
                "FAKE-XYZ" => Ok(Vec::new()),
                "DOWN-USD" => Err(FetchError::Api {
                    status: 503,
                    message: "unavailable".into(),
                }),
                _ => {
                    let days = (range.end - range.start).num_days().max(0) as u64;
                    Ok((0..days)
                        .map(|i| {
                            let close = dec!(42000) + Decimal::from(i * 25);
                            DailyBar {
                                date: range.start + Days::new(i),
                                open: close - dec!(10),
                                high: close + dec!(100),
                                low: close - dec!(100),
                                close,
                                volume: 1,
                            }
                        })
                        .collect())
                }
            }
        }
    }

    fn config(symbol: &str, output: PathBuf) -> RunConfig {
        RunConfig {
            symbol: symbol.to_string(),
            range: DateRange::new(date(2024, 1, 1), date(2024, 3, 1)),
            render: RenderOptions {
                output: Some(output),
                open_viewer: false,
                ..RenderOptions::default()
            },
        }
    }

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["crypto-chart"]).unwrap();

        assert_eq!(cli.symbol, "BTC-USD");
        assert_eq!(cli.start, date(2024, 1, 1));
        assert!(cli.end.is_none());
        assert_eq!(cli.window, 30);
        assert!(cli.output.is_none());
        assert!(!cli.no_open);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn parse_explicit_args() {
        let cli = Cli::try_parse_from([
            "crypto-chart",
            "-s",
            "ETH-USD",
            "--start",
            "2024-01-01",
            "--end",
            "2024-03-01",
            "--window",
            "20",
            "-o",
            "/tmp/eth.svg",
            "--no-open",
        ])
        .unwrap();

        assert_eq!(cli.symbol, "ETH-USD");
        assert_eq!(cli.end, Some(date(2024, 3, 1)));
        assert_eq!(cli.window, 20);
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/eth.svg")));
        assert!(cli.no_open);
    }

    #[test]
    fn parse_rejects_bad_date() {
        assert!(Cli::try_parse_from(["crypto-chart", "--start", "01/01/2024"]).is_err());
    }

    #[test]
    fn omitted_end_resolves_to_today() {
        let config = Cli::try_parse_from(["crypto-chart"]).unwrap().into_config();

        assert_eq!(config.range.start, date(2024, 1, 1));
        assert_eq!(config.range.end, Local::now().date_naive());
        assert!(config.render.open_viewer);
    }

    #[tokio::test]
    async fn run_charts_sixty_days() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("btc.svg");
        let provider = StubProvider::new();

        let mut out = Vec::new();

        let path = run(&provider, &config("BTC-USD", output.clone()), &mut out)
            .await
            .unwrap();

        assert_eq!(path, Some(output.clone()));
        assert!(out.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains("BTC-USD Price Analysis"));
    }

    #[tokio::test]
    async fn run_skips_chart_when_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("fake.svg");
        let provider = StubProvider::new();

        let mut out = Vec::new();

        let path = run(&provider, &config("FAKE-XYZ", output.clone()), &mut out)
            .await
            .unwrap();

        assert!(path.is_none());
        assert!(!output.exists());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error fetching data: No data found for FAKE-XYZ in the specified date range.\n"
        );
    }

    #[tokio::test]
    async fn run_skips_chart_when_fetch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("down.svg");
        let provider = StubProvider::new();

        let mut out = Vec::new();

        let path = run(&provider, &config("DOWN-USD", output.clone()), &mut out)
            .await
            .unwrap();

        assert!(path.is_none());
        assert!(!output.exists());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error fetching data: API error (503): unavailable\n"
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_or_report_yields_table() {
        let provider = StubProvider::new();
        let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 1));

        let mut out = Vec::new();

        let table = fetch_or_report(&provider, "BTC-USD", &range, &mut out)
            .await
            .unwrap()
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(table.len(), 60);
        assert_eq!(table.last_date(), Some(date(2024, 2, 29)));
    }
}
