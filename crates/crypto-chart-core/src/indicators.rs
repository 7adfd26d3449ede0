use ta::Next;
use ta::indicators::SimpleMovingAverage;

use crate::error::DataError;

/// Default look-back for the close-price moving average.
pub const DEFAULT_MA_WINDOW: usize = 30;

/// Trailing simple moving average over `values`.
///
/// The output has one entry per input. Entries before the window fills
/// (the first `window - 1`) are `None`; every later entry is the mean of that
/// value and the `window - 1` before it.
pub fn simple_moving_average(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, DataError> {
    let mut sma = SimpleMovingAverage::new(window).map_err(|_| DataError::InvalidWindow(window))?;

    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            // ta averages over a partial window while warming up; hide those values
            let mean = sma.next(v);
            (i + 1 >= window).then_some(mean)
        })
        .collect())
}
