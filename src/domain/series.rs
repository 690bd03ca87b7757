//! Date-indexed series used for prices, returns, exposure and equity.

use chrono::{Datelike, NaiveDate, Weekday};

use super::error::VolcrossError;

/// An ordered mapping from trading date to value.
///
/// Dates are strictly increasing; every constructor enforces this, so lookups
/// can binary-search the date column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    dates: Vec<NaiveDate>,
    values: Vec<T>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimeSeries<T> {
    pub fn new() -> Self {
        TimeSeries {
            dates: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TimeSeries {
            dates: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Build from points that are already in date order.
    pub fn from_points<I>(points: I) -> Result<Self, VolcrossError>
    where
        I: IntoIterator<Item = (NaiveDate, T)>,
    {
        let iter = points.into_iter();
        let mut series = Self::with_capacity(iter.size_hint().0);
        for (date, value) in iter {
            series.push(date, value)?;
        }
        Ok(series)
    }

    /// Append a point. The date must be later than the current last date.
    pub fn push(&mut self, date: NaiveDate, value: T) -> Result<(), VolcrossError> {
        if self.dates.last().is_some_and(|&last| date <= last) {
            return Err(VolcrossError::SeriesOrder { date });
        }
        self.dates.push(date);
        self.values.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&T> {
        self.position(date).map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &T)> + '_ {
        self.dates.iter().copied().zip(self.values.iter())
    }

    /// Points with `start <= date <= end`.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = (NaiveDate, &T)> + '_ {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end).max(lo);
        self.dates[lo..hi]
            .iter()
            .copied()
            .zip(self.values[lo..hi].iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(NaiveDate, &T) -> U) -> TimeSeries<U> {
        TimeSeries {
            dates: self.dates.clone(),
            values: self.iter().map(|(d, v)| f(d, v)).collect(),
        }
    }
}

impl<T: Copy> TimeSeries<T> {
    pub fn value(&self, date: NaiveDate) -> Option<T> {
        self.get(date).copied()
    }

    pub fn last_value(&self) -> Option<T> {
        self.values.last().copied()
    }

    pub fn first_value(&self) -> Option<T> {
        self.values.first().copied()
    }
}

/// Monday through Friday. Exchange holidays are handled by the series index
/// itself: a holiday simply has no point.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
