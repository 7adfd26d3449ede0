use chrono::NaiveDate;

use crate::candle::{DailyBar, decimal_to_f64};
use crate::error::DataError;
use crate::indicators;

/// Chronologically ordered daily bars, at most one per date.
///
/// The table is immutable once built; every accessor borrows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OhlcTable {
    bars: Vec<DailyBar>,
}

impl OhlcTable {
    /// Build a table from bars in any order.
    /// Bars are sorted by date; when a date repeats, the last bar supplied for it wins.
    pub fn from_bars(mut bars: Vec<DailyBar>) -> Self {
        // stable sort keeps input order within a date, so the last duplicate is the newest
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<DailyBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.date == bar.date => *prev = bar,
                _ => deduped.push(bar),
            }
        }

        Self { bars: deduped }
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| decimal_to_f64(b.close)).collect()
    }

    /// Lowest low and highest high across the table.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        let low = self.bars.iter().map(|b| b.low).min()?;
        let high = self.bars.iter().map(|b| b.high).max()?;
        Some((decimal_to_f64(low), decimal_to_f64(high)))
    }

    /// Trailing simple moving average of the close, aligned with `bars()`.
    pub fn close_moving_average(&self, window: usize) -> Result<Vec<Option<f64>>, DataError> {
        indicators::simple_moving_average(&self.closes(), window)
    }
}
