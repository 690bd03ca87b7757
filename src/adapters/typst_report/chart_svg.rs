//! SVG equity chart for reports.

use crate::domain::backtest::TradeRow;
use crate::domain::valuation::EquityCurve;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

/// Equity line with holding periods shaded. Empty string for an empty curve.
pub fn generate_equity_svg(curve: &EquityCurve, trades: &[TradeRow]) -> String {
    let (Some(start_date), Some(end_date)) = (curve.first_date(), curve.last_date()) else {
        return String::new();
    };
    let values = curve.values();

    let min_equity = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_equity = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max_equity - min_equity > 0.0 {
        max_equity - min_equity
    } else {
        1.0
    };

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let span_days = (end_date - start_date).num_days().max(1) as f64;

    let x_of = |date: chrono::NaiveDate| -> f64 {
        let offset = (date - start_date).num_days() as f64;
        MARGIN_LEFT + (offset / span_days).clamp(0.0, 1.0) * plot_width
    };
    let y_of =
        |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_equity) / range) * plot_height };

    let mut path_data = String::new();
    for (i, (date, &equity)) in curve.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        path_data.push_str(&format!("{} {:.1} {:.1}", cmd, x_of(date), y_of(equity)));
    }

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

    for trade in trades {
        if trade.sell_date < start_date || trade.buy_date > end_date {
            continue;
        }
        let x0 = x_of(trade.buy_date);
        let x1 = x_of(trade.sell_date);
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{}\" width=\"{:.1}\" height=\"{}\" fill=\"#e8f0fe\"/>\n",
            x0,
            MARGIN_TOP,
            (x1 - x0).max(1.0),
            plot_height
        ));
    }

    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    for (label, y) in [
        (max_equity, MARGIN_TOP + 5.0),
        (min_equity, CHART_HEIGHT - MARGIN_BOTTOM - 5.0),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{:.2}</text>\n",
            MARGIN_LEFT - 5.0,
            y,
            label
        ));
    }
    for (date, x) in [
        (start_date, MARGIN_LEFT),
        (end_date, CHART_WIDTH - MARGIN_RIGHT),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x, CHART_HEIGHT - 10.0, date
        ));
    }
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"1.5\"/>\n",
        path_data
    ));
    svg.push_str("</svg>");
    svg
}
