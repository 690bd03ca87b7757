#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use volcross::domain::backtest::{BacktestConfig, DEFAULT_VOLATILITY_SYMBOL};
use volcross::domain::error::VolcrossError;
use volcross::domain::series::TimeSeries;
use volcross::ports::series_port::SeriesPort;

pub struct MockSeriesPort {
    pub data: HashMap<String, TimeSeries<f64>>,
    pub errors: HashMap<String, String>,
}

impl MockSeriesPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: TimeSeries<f64>) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl SeriesPort for MockSeriesPort {
    fn load(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries<f64>, VolcrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(VolcrossError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let series = match self.data.get(symbol) {
            Some(s) => {
                TimeSeries::from_points(s.range(start_date, end_date).map(|(d, &v)| (d, v)))?
            }
            None => TimeSeries::new(),
        };
        if series.is_empty() {
            return Err(VolcrossError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no rows".to_string(),
            });
        }
        Ok(series)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One point per calendar day starting at `start`.
pub fn daily(start: NaiveDate, values: &[f64]) -> TimeSeries<f64> {
    TimeSeries::from_points(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + Duration::days(i as i64), v)),
    )
    .unwrap()
}

pub fn flat(start: NaiveDate, days: usize, value: f64) -> TimeSeries<f64> {
    daily(start, &vec![value; days])
}

pub fn make_config(start: &str, end: &str) -> BacktestConfig {
    BacktestConfig {
        ticker: "QLD".into(),
        volatility_symbol: DEFAULT_VOLATILITY_SYMBOL.into(),
        start_date: date(start),
        end_date: date(end),
        threshold: 40.0,
        holding_days: 252,
        delay_days: 30,
        cooldown_days: 252,
        stop_loss: 0.20,
    }
}
