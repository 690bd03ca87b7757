//! Backtest pipeline: returns, signal scan, exposure, equity, metrics.
//!
//! BacktestConfig defines the run parameters; BacktestResult is the contract
//! handed to reports and the console summary.

use chrono::NaiveDate;
use tracing::info;

use super::error::VolcrossError;
use super::exposure::build_exposure;
use super::metrics::Performance;
use super::position::ExitReason;
use super::returns::{pct_change, MIN_PRICE_POINTS};
use super::series::TimeSeries;
use super::signal::{scan, CrossingRecord, SignalParams, SignalScan};
use super::valuation::{equity_curve, EquityCurve};
use crate::ports::series_port::SeriesPort;

pub const DEFAULT_VOLATILITY_SYMBOL: &str = "^VIX";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub ticker: String,
    pub volatility_symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub threshold: f64,
    pub holding_days: i64,
    pub delay_days: i64,
    pub cooldown_days: i64,
    pub stop_loss: f64,
}

impl BacktestConfig {
    pub fn signal_params(&self) -> SignalParams {
        SignalParams {
            threshold: self.threshold,
            delay_days: self.delay_days,
            holding_days: self.holding_days,
            cooldown_days: self.cooldown_days,
            stop_loss: self.stop_loss,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRow {
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub entry_price: f64,
    pub exit_reason: ExitReason,
    pub return_pct: Option<f64>,
    pub mdd_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<TradeRow>,
    pub crossings: Vec<CrossingRecord>,
    pub cumulative_return_pct: Option<f64>,
    pub worst_mdd_pct: Option<f64>,
    pub worst_mdd_date: Option<NaiveDate>,
    pub expected_annual_return_pct: Option<f64>,
    pub equity_curve: EquityCurve,
}

impl BacktestResult {
    pub fn stop_loss_exits(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.exit_reason == ExitReason::StopLoss)
            .count()
    }
}

fn pct(value: Option<f64>) -> Option<f64> {
    value.map(|v| v * 100.0)
}

fn require_points(series: &TimeSeries<f64>, symbol: &str) -> Result<(), VolcrossError> {
    if series.len() < MIN_PRICE_POINTS {
        return Err(VolcrossError::InsufficientData {
            symbol: symbol.to_string(),
            points: series.len(),
            minimum: MIN_PRICE_POINTS,
        });
    }
    Ok(())
}

/// Scan for crossings once both series are long enough to trade on.
pub fn scan_signals(
    volatility: &TimeSeries<f64>,
    prices: &TimeSeries<f64>,
    config: &BacktestConfig,
) -> Result<SignalScan, VolcrossError> {
    require_points(volatility, &config.volatility_symbol)?;
    require_points(prices, &config.ticker)?;

    let signals = scan(volatility, prices, &config.signal_params());
    info!(
        crossings = signals.crossings.len(),
        trades = signals.trades.len(),
        "signal scan complete"
    );
    Ok(signals)
}

/// Run the strategy over already-loaded series.
pub fn run_backtest(
    volatility: &TimeSeries<f64>,
    prices: &TimeSeries<f64>,
    config: &BacktestConfig,
) -> Result<BacktestResult, VolcrossError> {
    let signals = scan_signals(volatility, prices, config)?;
    let returns = pct_change(prices, &config.ticker)?;

    let exposure = build_exposure(&signals.trades, prices);
    let equity = equity_curve(&exposure, &returns);
    let performance = Performance::compute(&equity, &signals.trades);

    let trades = performance
        .trades
        .iter()
        .map(|s| TradeRow {
            buy_date: s.trade.buy_date,
            sell_date: s.trade.sell_date,
            entry_price: s.trade.entry_price,
            exit_reason: s.trade.exit_reason,
            return_pct: pct(s.trade_return),
            mdd_pct: pct(s.max_drawdown),
        })
        .collect();

    Ok(BacktestResult {
        trades,
        crossings: signals.crossings,
        cumulative_return_pct: pct(performance.cumulative_return),
        worst_mdd_pct: pct(performance.worst_drawdown.map(|w| w.drawdown)),
        worst_mdd_date: performance.worst_drawdown.map(|w| w.buy_date),
        expected_annual_return_pct: pct(performance.cagr),
        equity_curve: equity,
    })
}

/// Load both series through `port` and run the backtest.
pub fn run_from_port(
    port: &dyn SeriesPort,
    config: &BacktestConfig,
) -> Result<BacktestResult, VolcrossError> {
    let volatility = port.load(&config.volatility_symbol, config.start_date, config.end_date)?;
    let prices = port.load(&config.ticker, config.start_date, config.end_date)?;
    info!(
        volatility = %config.volatility_symbol,
        volatility_points = volatility.len(),
        ticker = %config.ticker,
        price_points = prices.len(),
        "series loaded"
    );
    run_backtest(&volatility, &prices, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{CrossingOutcome, DropReason};
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn sample_config() -> BacktestConfig {
        BacktestConfig {
            ticker: "QLD".into(),
            volatility_symbol: DEFAULT_VOLATILITY_SYMBOL.into(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            threshold: 40.0,
            holding_days: 252,
            delay_days: 30,
            cooldown_days: 252,
            stop_loss: 0.20,
        }
    }

    fn daily(values: &[f64]) -> TimeSeries<f64> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TimeSeries::from_points(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (start + Duration::days(i as i64), v)),
        )
        .unwrap()
    }

    #[test]
    fn signal_params_follow_config() {
        let config = BacktestConfig {
            threshold: 35.0,
            cooldown_days: 300,
            ..sample_config()
        };
        let params = config.signal_params();
        assert_eq!(params.threshold, 35.0);
        assert_eq!(params.cooldown_days, 300);
        assert_eq!(params.holding_days, 252);
        assert_eq!(params.delay_days, 30);
    }

    #[test]
    fn no_crossing_means_flat_curve() {
        let vol = daily(&vec![20.0; 50]);
        let prices = daily(&(0..50).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let result = run_backtest(&vol, &prices, &sample_config()).unwrap();

        assert!(result.trades.is_empty());
        assert!(result.crossings.is_empty());
        assert!(result.equity_curve.values().iter().all(|&v| v == 1.0));
        assert_relative_eq!(result.cumulative_return_pct.unwrap(), 0.0);
        assert!(result.worst_mdd_pct.is_none());
        assert!(result.worst_mdd_date.is_none());
    }

    #[test]
    fn short_price_series_is_insufficient() {
        let vol = daily(&[50.0, 30.0]);
        let prices = daily(&[100.0]);
        let err = run_backtest(&vol, &prices, &sample_config()).unwrap_err();
        assert!(matches!(err, VolcrossError::InsufficientData { ref symbol, .. } if symbol == "QLD"));
    }

    #[test]
    fn short_volatility_series_is_insufficient() {
        let vol = daily(&[50.0]);
        let prices = daily(&[100.0, 101.0]);
        let err = run_backtest(&vol, &prices, &sample_config()).unwrap_err();
        assert!(matches!(err, VolcrossError::InsufficientData { ref symbol, .. } if symbol == "^VIX"));
    }

    #[test]
    fn scan_signals_rejects_short_volatility_series() {
        let vol = daily(&[30.0]);
        let prices = daily(&vec![100.0; 40]);
        let err = scan_signals(&vol, &prices, &sample_config()).unwrap_err();
        assert!(matches!(
            err,
            VolcrossError::InsufficientData { ref symbol, points: 1, minimum: 2 } if symbol == "^VIX"
        ));
    }

    #[test]
    fn scan_signals_rejects_empty_price_series() {
        let vol = daily(&[50.0, 30.0]);
        let prices = TimeSeries::<f64>::from_points(Vec::new()).unwrap();
        let err = scan_signals(&vol, &prices, &sample_config()).unwrap_err();
        assert!(matches!(err, VolcrossError::InsufficientData { ref symbol, points: 0, .. } if symbol == "QLD"));
    }

    #[test]
    fn oversized_holding_drops_crossing_instead_of_panicking() {
        let mut vol = vec![30.0; 60];
        vol[0] = 45.0;
        let config = BacktestConfig {
            holding_days: i64::MAX,
            delay_days: 0,
            ..sample_config()
        };
        let result = run_backtest(&daily(&vol), &daily(&vec![100.0; 60]), &config).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.crossings.len(), 1);
        assert!(matches!(
            result.crossings[0].outcome,
            CrossingOutcome::Dropped(DropReason::DateOutOfRange { .. })
        ));
    }

    #[test]
    fn percentages_scale_fractions() {
        assert_eq!(pct(Some(0.125)), Some(12.5));
        assert_eq!(pct(None), None);
    }

    #[test]
    fn single_crossing_yields_one_row() {
        let mut vol = vec![30.0; 400];
        vol[0] = 45.0;
        let vol = daily(&vol);
        let prices = daily(&vec![100.0; 400]);
        let result = run_backtest(&vol, &prices, &sample_config()).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].buy_date, NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(result.trades[0].exit_reason, ExitReason::HorizonExpired);
        assert_relative_eq!(result.trades[0].return_pct.unwrap(), 0.0);
        assert_eq!(result.stop_loss_exits(), 0);
    }
}
