//! Threshold-crossing detection and entry/exit scheduling.
//!
//! The scan is a fold over adjacent volatility observations. Each step takes
//! the previous [`ScanState`] by value and returns the next one, so the only
//! state that survives a step is what the step explicitly hands on.

use chrono::{Duration, NaiveDate};
use std::fmt;
use tracing::debug;

use super::position::{ExitReason, Trade};
use super::series::{is_business_day, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
}

/// A transition from above to below the threshold between two observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEvent {
    pub date: NaiveDate,
    pub direction: Direction,
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The instrument has no close on the computed buy date.
    NoPriceOnBuyDate { buy_date: NaiveDate },
    /// The buy date is at or past the instrument's last observation.
    BeyondSeriesEnd { buy_date: NaiveDate },
    /// The close on the buy date is zero, negative or not finite.
    InvalidEntryPrice { buy_date: NaiveDate },
    /// The delay or holding offset leaves the representable calendar.
    DateOutOfRange { crossing_date: NaiveDate },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NoPriceOnBuyDate { buy_date } => write!(f, "no price on {buy_date}"),
            DropReason::BeyondSeriesEnd { buy_date } => {
                write!(f, "buy date {buy_date} is past the end of the data")
            }
            DropReason::InvalidEntryPrice { buy_date } => {
                write!(f, "unusable entry price on {buy_date}")
            }
            DropReason::DateOutOfRange { crossing_date } => {
                write!(f, "offset from {crossing_date} is outside the calendar")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingOutcome {
    Admitted,
    InPosition,
    Cooldown { last_buy_date: NaiveDate },
    Dropped(DropReason),
}

impl fmt::Display for CrossingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossingOutcome::Admitted => write!(f, "admitted"),
            CrossingOutcome::InPosition => write!(f, "blocked: position open"),
            CrossingOutcome::Cooldown { last_buy_date } => {
                write!(f, "blocked: cooldown since {last_buy_date}")
            }
            CrossingOutcome::Dropped(reason) => write!(f, "dropped: {reason}"),
        }
    }
}

/// Audit-log entry: every observed crossing, whether or not it traded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingRecord {
    pub event: CrossingEvent,
    pub outcome: CrossingOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub threshold: f64,
    pub delay_days: i64,
    pub holding_days: i64,
    pub cooldown_days: i64,
    pub stop_loss: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            threshold: 40.0,
            delay_days: 30,
            holding_days: 252,
            cooldown_days: 252,
            stop_loss: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanState {
    pub in_position: bool,
    pub sell_date: Option<NaiveDate>,
    pub last_buy_date: Option<NaiveDate>,
}

impl ScanState {
    fn cooling_down(&self, date: NaiveDate, cooldown_days: i64) -> Option<NaiveDate> {
        self.last_buy_date
            .filter(|last| (date - *last).num_days() <= cooldown_days)
    }

    fn opened(trade: &Trade) -> Self {
        ScanState {
            in_position: true,
            sell_date: Some(trade.sell_date),
            last_buy_date: Some(trade.buy_date),
        }
    }

    /// Close the position once the scan has reached its sell date.
    fn settle(self, date: NaiveDate) -> Self {
        match self.sell_date {
            Some(sell) if self.in_position && date >= sell => ScanState {
                in_position: false,
                ..self
            },
            _ => self,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalScan {
    pub crossings: Vec<CrossingRecord>,
    pub trades: Vec<Trade>,
}

impl SignalScan {
    /// Crossings that did not become trades.
    pub fn missed(&self) -> impl Iterator<Item = &CrossingRecord> {
        self.crossings
            .iter()
            .filter(|r| r.outcome != CrossingOutcome::Admitted)
    }
}

/// Strict test on both sides: a value equal to the threshold never crosses.
pub fn crossing_at(
    prev: f64,
    date: NaiveDate,
    value: f64,
    threshold: f64,
) -> Option<CrossingEvent> {
    (prev > threshold && value < threshold).then_some(CrossingEvent {
        date,
        direction: Direction::Down,
        before: prev,
        after: value,
    })
}

fn offset(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
}

/// Turn a crossing into a trade against the instrument's closes.
///
/// Buys `delay_days` after the crossing, holds for `holding_days`, and exits
/// early on the first business-day close strictly below
/// `entry_price * (1 - stop_loss)`.
pub fn schedule(
    event: &CrossingEvent,
    prices: &TimeSeries<f64>,
    params: &SignalParams,
) -> Result<Trade, DropReason> {
    let out_of_range = DropReason::DateOutOfRange {
        crossing_date: event.date,
    };
    let buy_date = offset(event.date, params.delay_days).ok_or(out_of_range)?;

    match prices.last_date() {
        Some(last) if buy_date < last => {}
        _ => return Err(DropReason::BeyondSeriesEnd { buy_date }),
    }

    let entry_price = prices
        .value(buy_date)
        .ok_or(DropReason::NoPriceOnBuyDate { buy_date })?;
    if !(entry_price.is_finite() && entry_price > 0.0) {
        return Err(DropReason::InvalidEntryPrice { buy_date });
    }

    let default_sell = offset(buy_date, params.holding_days).ok_or(out_of_range)?;
    let stop_level = entry_price * (1.0 - params.stop_loss);

    let stop_hit = prices
        .range(buy_date, default_sell)
        .filter(|(date, _)| is_business_day(*date))
        .find(|(_, close)| **close < stop_level)
        .map(|(date, _)| date);

    Ok(match stop_hit {
        Some(sell_date) => Trade {
            buy_date,
            sell_date,
            entry_price,
            exit_reason: ExitReason::StopLoss,
        },
        None => Trade {
            buy_date,
            sell_date: default_sell,
            entry_price,
            exit_reason: ExitReason::HorizonExpired,
        },
    })
}

fn step(
    state: ScanState,
    event: &CrossingEvent,
    prices: &TimeSeries<f64>,
    params: &SignalParams,
) -> (ScanState, CrossingOutcome, Option<Trade>) {
    if state.in_position {
        return (state, CrossingOutcome::InPosition, None);
    }
    if let Some(last_buy_date) = state.cooling_down(event.date, params.cooldown_days) {
        return (state, CrossingOutcome::Cooldown { last_buy_date }, None);
    }
    match schedule(event, prices, params) {
        Ok(trade) => {
            debug!(
                crossing = %event.date,
                buy = %trade.buy_date,
                sell = %trade.sell_date,
                exit = %trade.exit_reason,
                "signal admitted"
            );
            (ScanState::opened(&trade), CrossingOutcome::Admitted, Some(trade))
        }
        Err(reason) => {
            debug!(crossing = %event.date, %reason, "signal dropped");
            (state, CrossingOutcome::Dropped(reason), None)
        }
    }
}

/// Walk the volatility series and produce the crossing audit log and trades.
pub fn scan(
    volatility: &TimeSeries<f64>,
    prices: &TimeSeries<f64>,
    params: &SignalParams,
) -> SignalScan {
    let pairs = volatility.iter().zip(volatility.iter().skip(1));

    let (_, result) = pairs.fold(
        (ScanState::default(), SignalScan::default()),
        |(state, mut out), ((_, &prev), (date, &value))| {
            let state = match crossing_at(prev, date, value, params.threshold) {
                Some(event) => {
                    let (next, outcome, trade) = step(state, &event, prices, params);
                    out.crossings.push(CrossingRecord { event, outcome });
                    out.trades.extend(trade);
                    next
                }
                None => state,
            };
            (state.settle(date), out)
        },
    );

    result
}
