//! Table formatting for reports.
//!
//! Provides functions to generate Typst markup for:
//! - Run parameters
//! - Headline results
//! - Trade log with styled return and drawdown cells
//! - Crossing audit log

use chrono::NaiveDate;

use super::style::style;
use crate::domain::backtest::{BacktestConfig, BacktestResult, TradeRow};
use crate::domain::signal::CrossingRecord;

/// Typst markup treats `%`, `#`, `$` and brackets specially inside content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '#' | '$' | '[' | ']' | '*' | '_' | '@' | '<' | '>' | '\\' | '%') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => escape(&format!("{:.2}%", v)),
        None => "n/a".to_string(),
    }
}

fn fmt_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn format_parameters(config: &BacktestConfig) -> String {
    let rows = [
        ("Instrument", escape(&config.ticker)),
        ("Volatility index", escape(&config.volatility_symbol)),
        (
            "Period",
            format!("{} to {}", config.start_date, config.end_date),
        ),
        ("Threshold", format!("{:.2}", config.threshold)),
        ("Entry delay", format!("{} days", config.delay_days)),
        ("Holding horizon", format!("{} days", config.holding_days)),
        ("Cooldown", format!("{} days", config.cooldown_days)),
        ("Stop loss", escape(&format!("{:.1}%", config.stop_loss * 100.0))),
    ];

    let mut out = String::from("#table(\n  columns: 2,\n  [*Parameter*], [*Value*],\n");
    for (name, value) in rows {
        out.push_str(&format!("  [{}], [{}],\n", name, value));
    }
    out.push_str(")\n");
    out
}

pub fn format_summary(result: &BacktestResult) -> String {
    let mut out = String::from("#table(\n  columns: 2,\n  [*Metric*], [*Value*],\n");

    let styled = |v: Option<f64>| match v {
        Some(x) => style(x, 0.0).apply(&fmt_pct(Some(x))),
        None => "[n/a]".to_string(),
    };

    out.push_str(&format!(
        "  [Cumulative return], {},\n",
        styled(result.cumulative_return_pct)
    ));
    out.push_str(&format!(
        "  [Expected annual return (CAGR)], {},\n",
        styled(result.expected_annual_return_pct)
    ));
    out.push_str(&format!(
        "  [Worst trade drawdown], {},\n",
        styled(result.worst_mdd_pct)
    ));
    out.push_str(&format!(
        "  [Worst drawdown trade], [{}],\n",
        fmt_date(result.worst_mdd_date)
    ));
    out.push_str(&format!("  [Trades], [{}],\n", result.trades.len()));
    out.push_str(&format!(
        "  [Stop-loss exits], [{}],\n",
        result.stop_loss_exits()
    ));
    out.push_str(&format!("  [Crossings observed], [{}],\n", result.crossings.len()));
    out.push_str(")\n");
    out
}

pub fn format_trade_log(trades: &[TradeRow], worst_mdd_date: Option<NaiveDate>) -> String {
    if trades.is_empty() {
        return "_No trades executed._\n".to_string();
    }

    let mut out = String::new();
    out.push_str("#table(\n");
    out.push_str("  columns: 7,\n");
    out.push_str("  align: (right, left, left, left, right, right, right),\n");
    out.push_str("  [*#*], [*Buy*], [*Sell*], [*Exit*], [*Entry*], [*Return*], [*MDD*],\n");

    for (i, trade) in trades.iter().enumerate() {
        let ret = match trade.return_pct {
            Some(r) => style(r, 0.0).apply(&fmt_pct(Some(r))),
            None => "[n/a]".to_string(),
        };
        let mdd = match trade.mdd_pct {
            Some(m) => {
                let cell = style(m, 0.0);
                let cell = if Some(trade.buy_date) == worst_mdd_date {
                    cell.strong()
                } else {
                    cell
                };
                cell.apply(&fmt_pct(Some(m)))
            }
            None => "[n/a]".to_string(),
        };
        out.push_str(&format!(
            "  [{}], [{}], [{}], [{}], [{:.2}], {}, {},\n",
            i + 1,
            trade.buy_date.format("%Y-%m-%d"),
            trade.sell_date.format("%Y-%m-%d"),
            trade.exit_reason,
            trade.entry_price,
            ret,
            mdd
        ));
    }

    out.push_str(")\n");
    out
}

pub fn format_crossing_log(crossings: &[CrossingRecord]) -> String {
    if crossings.is_empty() {
        return "_No threshold crossings in the period._\n".to_string();
    }

    let mut out = String::new();
    out.push_str("#table(\n");
    out.push_str("  columns: 4,\n");
    out.push_str("  [*Date*], [*Before*], [*After*], [*Outcome*],\n");
    for record in crossings {
        out.push_str(&format!(
            "  [{}], [{:.2}], [{:.2}], [{}],\n",
            record.event.date.format("%Y-%m-%d"),
            record.event.before,
            record.event.after,
            escape(&record.outcome.to_string())
        ));
    }
    out.push_str(")\n");
    out
}
