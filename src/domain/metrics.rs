//! Performance metrics over the equity curve and trade list.
//!
//! Ratios with a zero or undefined base come back as `None`; such values are
//! left out of aggregates instead of being counted as zero.

use chrono::NaiveDate;

use super::position::Trade;
use super::returns::ratio_change;
use super::valuation::EquityCurve;

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub trade: Trade,
    pub trade_return: Option<f64>,
    pub max_drawdown: Option<f64>,
}

impl TradeStats {
    /// A trade counts toward aggregates only when both of its dates were valued.
    pub fn is_measured(&self) -> bool {
        self.trade_return.is_some() && self.max_drawdown.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorstDrawdown {
    pub drawdown: f64,
    pub buy_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub trades: Vec<TradeStats>,
    pub cumulative_return: Option<f64>,
    pub cagr: Option<f64>,
    pub worst_drawdown: Option<WorstDrawdown>,
}

impl Performance {
    pub fn compute(equity: &EquityCurve, trades: &[Trade]) -> Self {
        let stats: Vec<TradeStats> = trades
            .iter()
            .map(|trade| TradeStats {
                trade: trade.clone(),
                trade_return: trade_return(equity, trade),
                max_drawdown: trade_max_drawdown(equity, trade),
            })
            .collect();

        let worst_drawdown = worst_drawdown(&stats);

        Performance {
            cumulative_return: cumulative_return(equity),
            cagr: cagr(equity),
            worst_drawdown,
            trades: stats,
        }
    }

    pub fn measured_trades(&self) -> impl Iterator<Item = &TradeStats> {
        self.trades.iter().filter(|s| s.is_measured())
    }
}

/// `(equity[sell] - equity[buy]) / equity[buy]`.
pub fn trade_return(equity: &EquityCurve, trade: &Trade) -> Option<f64> {
    let buy = equity.value(trade.buy_date)?;
    let sell = equity.value(trade.sell_date)?;
    ratio_change(buy, sell)
}

/// Deepest decline within `[buy_date, sell_date]`, measured against a running
/// peak that starts at the buy date. Negative or zero.
pub fn trade_max_drawdown(equity: &EquityCurve, trade: &Trade) -> Option<f64> {
    equity.value(trade.buy_date)?;
    equity.value(trade.sell_date)?;

    let mut peak = f64::NEG_INFINITY;
    let mut worst: Option<f64> = None;

    for (_, &value) in equity.range(trade.buy_date, trade.sell_date) {
        peak = peak.max(value);
        if let Some(dd) = ratio_change(peak, value) {
            worst = Some(worst.map_or(dd, |w| w.min(dd)));
        }
    }

    worst
}

/// `equity[last] / equity[first] - 1`.
pub fn cumulative_return(equity: &EquityCurve) -> Option<f64> {
    ratio_change(equity.first_value()?, equity.last_value()?)
}

/// Compound annual growth rate over the calendar span of the curve.
pub fn cagr(equity: &EquityCurve) -> Option<f64> {
    let days = (equity.last_date()? - equity.first_date()?).num_days();
    if days <= 0 {
        return None;
    }
    let growth = 1.0 + cumulative_return(equity)?;
    if growth < 0.0 {
        return None;
    }
    Some(growth.powf(DAYS_PER_YEAR / days as f64) - 1.0)
}

/// Minimum trade drawdown; on a tie the earlier buy date wins.
pub fn worst_drawdown(stats: &[TradeStats]) -> Option<WorstDrawdown> {
    stats
        .iter()
        .filter(|s| s.is_measured())
        .filter_map(|s| {
            s.max_drawdown.map(|drawdown| WorstDrawdown {
                drawdown,
                buy_date: s.trade.buy_date,
            })
        })
        .fold(None, |acc: Option<WorstDrawdown>, cand| match acc {
            Some(best)
                if best.drawdown < cand.drawdown
                    || (best.drawdown == cand.drawdown && best.buy_date <= cand.buy_date) =>
            {
                Some(best)
            }
            _ => Some(cand),
        })
}
