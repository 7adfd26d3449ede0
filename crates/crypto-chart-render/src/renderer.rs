use std::io::Write;
use std::path::PathBuf;

use crypto_chart_core::indicators::DEFAULT_MA_WINDOW;
use crypto_chart_core::table::OhlcTable;
use tracing::{info, warn};

use crate::chart::PriceChart;
use crate::error::RenderError;
use crate::viewer;

/// How and where the chart is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Moving-average look-back in days.
    pub window: usize,
    /// SVG destination; `None` means `<tmp>/<symbol>-price-analysis.svg`.
    pub output: Option<PathBuf>,
    /// Hand the finished file to the platform's default viewer.
    pub open_viewer: bool,
    /// Width and height in pixels.
    pub size: (u32, u32),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_MA_WINDOW,
            output: None,
            open_viewer: true,
            size: (1280, 720),
        }
    }
}

impl RenderOptions {
    pub fn output_path(&self, symbol: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(default_file_name(symbol)))
    }
}

fn default_file_name(symbol: &str) -> String {
    let slug: String = symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{slug}-price-analysis.svg")
}

/// Draw the price analysis chart for `table` and show it.
///
/// With no table, writes `No data to plot.` to `out` and returns `Ok(None)`.
/// Otherwise returns the path of the written SVG. A viewer that fails to
/// launch is logged and does not fail the render.
pub fn render(
    table: Option<&OhlcTable>,
    symbol: &str,
    options: &RenderOptions,
    out: &mut impl Write,
) -> Result<Option<PathBuf>, RenderError> {
    let Some(table) = table else {
        writeln!(out, "No data to plot.")?;
        return Ok(None);
    };

    let chart = PriceChart::build(table, symbol, options.window)?;
    let path = options.output_path(symbol);
    chart.draw_svg_file(&path, options.size)?;
    info!(
        "{symbol}: chart with {} candle(s) written to {}",
        chart.candles.len(),
        path.display()
    );

    if options.open_viewer {
        if let Err(e) = viewer::open_in_viewer(&path) {
            warn!("could not open viewer for {}: {e}", path.display());
        }
    }

    Ok(Some(path))
}
