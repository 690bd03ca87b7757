//! Scheduled trades: one long holding from buy date to sell date.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    HorizonExpired,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::HorizonExpired => write!(f, "horizon"),
            ExitReason::StopLoss => write!(f, "stop-loss"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub entry_price: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Whether `date` lies in the inclusive holding interval.
    pub fn holds_on(&self, date: NaiveDate) -> bool {
        self.buy_date <= date && date <= self.sell_date
    }

    pub fn holding_days(&self) -> i64 {
        (self.sell_date - self.buy_date).num_days()
    }

    pub fn stopped_out(&self) -> bool {
        self.exit_reason == ExitReason::StopLoss
    }
}
