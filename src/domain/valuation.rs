//! Equity curve from exposure and daily instrument returns.

use super::exposure::ExposureSeries;
use super::series::TimeSeries;

pub type EquityCurve = TimeSeries<f64>;

/// `equity[t] = equity[t-1] * (1 + exposure[t-1] * return[t])`, starting at 1.0.
///
/// Exposure is lagged one bar: a position marked on day `t-1` earns day `t`'s
/// return. Missing returns, and dates absent from `exposure`, contribute nothing.
pub fn equity_curve(exposure: &ExposureSeries, returns: &TimeSeries<Option<f64>>) -> EquityCurve {
    let mut equity = 1.0_f64;
    let mut prev_exposure = 0.0_f64;

    returns.map(|date, ret| {
        if let Some(r) = ret {
            equity *= 1.0 + prev_exposure * r;
        }
        prev_exposure = f64::from(exposure.value(date).unwrap_or(0));
        equity
    })
}
