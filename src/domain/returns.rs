//! Day-over-day percentage change of a closing-price series.

use super::error::VolcrossError;
use super::series::TimeSeries;

pub const MIN_PRICE_POINTS: usize = 2;

/// Percentage change between consecutive closes, aligned to the input dates.
///
/// The first point has no predecessor and is `None`, as is any point whose
/// previous close is zero or not finite.
pub fn pct_change(
    prices: &TimeSeries<f64>,
    symbol: &str,
) -> Result<TimeSeries<Option<f64>>, VolcrossError> {
    if prices.len() < MIN_PRICE_POINTS {
        return Err(VolcrossError::InsufficientData {
            symbol: symbol.to_string(),
            points: prices.len(),
            minimum: MIN_PRICE_POINTS,
        });
    }

    let mut prev: Option<f64> = None;
    Ok(prices.map(|_, &close| {
        let r = prev.and_then(|p| ratio_change(p, close));
        prev = Some(close);
        r
    }))
}

/// `(curr - base) / base`, or `None` when the base cannot be divided by.
pub fn ratio_change(base: f64, curr: f64) -> Option<f64> {
    if base == 0.0 || !base.is_finite() || !curr.is_finite() {
        None
    } else {
        Some((curr - base) / base)
    }
}
