//! Price series access port trait.

use crate::domain::error::VolcrossError;
use crate::domain::series::TimeSeries;
use chrono::NaiveDate;

pub trait SeriesPort {
    /// Daily closes for `symbol` within `[start_date, end_date]`.
    ///
    /// An empty result is an error (`DataUnavailable`), never an empty series.
    fn load(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries<f64>, VolcrossError>;
}
