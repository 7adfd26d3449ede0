use std::path::Path;

use chrono::{Days, NaiveDate};
use crypto_chart_core::candle::decimal_to_f64;
use crypto_chart_core::table::OhlcTable;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::full_palette::{GREY, ORANGE};

use crate::error::RenderError;

pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Price (USD)";

const UP_COLOR: RGBColor = BLUE;
const DOWN_COLOR: RGBColor = GREY;
const AVERAGE_COLOR: RGBColor = ORANGE;

/// Whether a day closed at/above its open or below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candlestick {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub direction: Direction,
}

/// Everything needed to draw the price analysis chart, detached from the table it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChart {
    pub title: String,
    pub candle_series_name: String,
    pub average_series_name: String,
    pub candles: Vec<Candlestick>,
    /// One point per candle; `None` where the average is undefined.
    pub moving_average: Vec<(NaiveDate, Option<f64>)>,
    /// Lowest low and highest high.
    pub price_bounds: Option<(f64, f64)>,
}

impl PriceChart {
    /// Build the chart model for `symbol` with a `window`-day moving average of the close.
    pub fn build(table: &OhlcTable, symbol: &str, window: usize) -> Result<Self, RenderError> {
        let averages = table.close_moving_average(window)?;

        let candles = table
            .bars()
            .iter()
            .map(|bar| Candlestick {
                date: bar.date,
                open: decimal_to_f64(bar.open),
                high: decimal_to_f64(bar.high),
                low: decimal_to_f64(bar.low),
                close: decimal_to_f64(bar.close),
                direction: if bar.is_up() {
                    Direction::Up
                } else {
                    Direction::Down
                },
            })
            .collect();

        let moving_average = table
            .bars()
            .iter()
            .zip(averages)
            .map(|(bar, avg)| (bar.date, avg))
            .collect();

        Ok(Self {
            title: format!("{symbol} Price Analysis"),
            candle_series_name: format!("{symbol} Candlestick"),
            average_series_name: format!("{window} Day Moving Average"),
            candles,
            moving_average,
            price_bounds: table.price_bounds(),
        })
    }

    /// Runs of consecutive defined average points; each becomes one line.
    pub fn average_segments(&self) -> Vec<Vec<(NaiveDate, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();

        for &(date, value) in &self.moving_average {
            match value {
                Some(v) => current.push((date, v)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }

        segments
    }

    /// Render to an in-memory SVG document.
    pub fn draw_svg_string(&self, size: (u32, u32)) -> Result<String, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            self.draw_on(&root).map_err(drawing_error)?;
            root.present().map_err(drawing_error)?;
        }
        Ok(svg)
    }

    /// Render to an SVG file at `path`, creating parent directories as needed.
    pub fn draw_svg_file(&self, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let root = SVGBackend::new(path, size).into_drawing_area();
        self.draw_on(&root).map_err(drawing_error)?;
        root.present().map_err(drawing_error)?;
        Ok(())
    }

    fn y_range(&self) -> (f64, f64) {
        let Some((low, high)) = self.price_bounds else {
            return (0.0, 1.0);
        };

        let pad = ((high - low) * 0.05).max(1.0);
        (low - pad, high + pad)
    }

    fn x_range(&self) -> (NaiveDate, NaiveDate) {
        let first = self.candles.first().map(|c| c.date).unwrap_or_default();
        let last = self.candles.last().map(|c| c.date).unwrap_or(first);
        // one day of slack either side so edge candles aren't clipped
        (first - Days::new(1), last + Days::new(1))
    }

    fn draw_on<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let (x_from, x_to) = self.x_range();
        let (y_from, y_to) = self.y_range();

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 28))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(80)
            .build_cartesian_2d(x_from..x_to, y_from..y_to)?;

        chart
            .configure_mesh()
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .x_labels(10)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|v: &f64| format!("{v:.0}"))
            .light_line_style(WHITE)
            .draw()?;

        let plot_width = chart.plotting_area().dim_in_pixel().0;
        let candle_width = candle_width(plot_width, self.candles.len());

        chart
            .draw_series(self.candles.iter().map(|c| {
                CandleStick::new(
                    c.date,
                    c.open,
                    c.high,
                    c.low,
                    c.close,
                    UP_COLOR.filled(),
                    DOWN_COLOR.filled(),
                    candle_width,
                )
            }))?
            .label(&self.candle_series_name)
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], UP_COLOR.filled()));

        for (i, segment) in self.average_segments().into_iter().enumerate() {
            let series =
                chart.draw_series(LineSeries::new(segment, AVERAGE_COLOR.stroke_width(2)))?;
            if i == 0 {
                series
                    .label(&self.average_series_name)
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], AVERAGE_COLOR));
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }
}

/// Pixel width of each candle body, leaving a gap between neighbours.
fn candle_width(plot_width: u32, count: usize) -> u32 {
    if count == 0 {
        return 1;
    }
    let slot = plot_width as f64 / (count + 2) as f64;
    ((slot * 0.7) as u32).clamp(1, 15)
}

fn drawing_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(err.to_string())
}
