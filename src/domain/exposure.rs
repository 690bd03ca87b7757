//! Per-day exposure track built from scheduled trades.

use super::position::Trade;
use super::series::{is_business_day, TimeSeries};

pub type ExposureSeries = TimeSeries<u8>;

/// 1 on every business day of `index` inside any trade's `[buy_date, sell_date]`,
/// 0 elsewhere. Overlapping trades do not stack.
pub fn build_exposure<T>(trades: &[Trade], index: &TimeSeries<T>) -> ExposureSeries {
    index.map(|date, _| {
        let held = is_business_day(date) && trades.iter().any(|t| t.holds_on(date));
        u8::from(held)
    })
}
