//! CSV file series adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with a header row. The
//! first column is the date; the close is read from the `Close` column, then
//! `Adj Close`, then the second column.

use crate::domain::error::VolcrossError;
use crate::domain::series::TimeSeries;
use crate::domain::valuation::EquityCurve;
use crate::ports::series_port::SeriesPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct CsvSeriesAdapter {
    base_path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn close_column(headers: &csv::StringRecord) -> usize {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    find("close").or_else(|| find("adj close")).unwrap_or(1)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(field: &str) -> Option<NaiveDate> {
    let field = field.trim();
    let day = field.get(..10).unwrap_or(field);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl SeriesPort for CsvSeriesAdapter {
    fn load(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries<f64>, VolcrossError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            VolcrossError::unavailable(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| VolcrossError::unavailable(symbol, format!("CSV header error: {}", e)))?
            .clone();
        let close_idx = close_column(&headers);

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for result in rdr.records() {
            let record = result
                .map_err(|e| VolcrossError::unavailable(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = record.get(0).ok_or_else(|| {
                VolcrossError::unavailable(symbol, "missing date column")
            })?;
            let date = parse_date(date_str).ok_or_else(|| {
                VolcrossError::unavailable(symbol, format!("invalid date: {}", date_str))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            match record.get(close_idx).and_then(|v| v.trim().parse::<f64>().ok()) {
                Some(close) if close.is_finite() => points.push((date, close)),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(symbol, skipped, "rows without a usable close were skipped");
        }
        if points.is_empty() {
            return Err(VolcrossError::unavailable(
                symbol,
                format!("no rows between {} and {}", start_date, end_date),
            ));
        }

        points.sort_by_key(|(date, _)| *date);
        points.dedup_by_key(|(date, _)| *date);
        debug!(symbol, points = points.len(), path = %path.display(), "series read");
        TimeSeries::from_points(points)
    }
}

/// Write an equity curve as `date,equity` rows.
pub fn write_equity_csv(curve: &EquityCurve, path: &Path) -> Result<(), VolcrossError> {
    let mut wtr = csv::Writer::from_path(path).map_err(std::io::Error::other)?;
    wtr.write_record(["date", "equity"])
        .map_err(std::io::Error::other)?;
    for (date, equity) in curve.iter() {
        wtr.write_record([date.to_string(), format!("{:.6}", equity)])
            .map_err(std::io::Error::other)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let vix = "Date,Open,High,Low,Close,Adj Close,Volume\n\
            2024-01-15,14.0,15.0,13.0,14.5,14.5,0\n\
            2024-01-16,14.5,16.0,14.0,15.8,15.8,0\n\
            2024-01-17,15.8,16.5,15.0,null,null,0\n\
            2024-01-18,15.0,15.5,14.0,14.2,14.2,0\n";
        fs::write(path.join("^VIX.csv"), vix).unwrap();

        let qld = "date,adj close\n\
            2024-01-16 00:00:00,80.5\n\
            2024-01-15 00:00:00,80.0\n";
        fs::write(path.join("QLD.csv"), qld).unwrap();

        fs::write(path.join("EMPTY.csv"), "date,close\n").unwrap();

        (dir, path)
    }

    #[test]
    fn load_reads_close_column() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter.load("^VIX", d(2024, 1, 1), d(2024, 12, 31)).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.value(d(2024, 1, 15)), Some(14.5));
        assert_eq!(series.value(d(2024, 1, 16)), Some(15.8));
        assert_eq!(series.value(d(2024, 1, 17)), None);
    }

    #[test]
    fn load_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter.load("^VIX", d(2024, 1, 16), d(2024, 1, 16)).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), Some(d(2024, 1, 16)));
    }

    #[test]
    fn load_sorts_and_accepts_time_suffix() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter.load("QLD", d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(series.dates(), &[d(2024, 1, 15), d(2024, 1, 16)]);
        assert_eq!(series.value(d(2024, 1, 16)), Some(80.5));
    }

    #[test]
    fn load_missing_file_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let err = adapter.load("XYZ", d(2024, 1, 1), d(2024, 1, 31)).unwrap_err();
        assert!(matches!(err, VolcrossError::DataUnavailable { symbol, .. } if symbol == "XYZ"));
    }

    #[test]
    fn load_empty_range_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        assert!(adapter.load("EMPTY", d(2024, 1, 1), d(2024, 1, 31)).is_err());
        assert!(adapter.load("^VIX", d(2020, 1, 1), d(2020, 12, 31)).is_err());
    }

    #[test]
    fn close_column_fallbacks() {
        let with_close = csv::StringRecord::from(vec!["Date", "Open", "Close"]);
        assert_eq!(close_column(&with_close), 2);
        let adj_only = csv::StringRecord::from(vec!["Date", "Adj Close"]);
        assert_eq!(close_column(&adj_only), 1);
        let unnamed = csv::StringRecord::from(vec!["day", "px", "other"]);
        assert_eq!(close_column(&unnamed), 1);
    }

    #[test]
    fn write_equity_csv_round_trips_rows() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("equity.csv");
        let curve =
            TimeSeries::from_points(vec![(d(2024, 1, 15), 1.0), (d(2024, 1, 16), 1.05)]).unwrap();

        write_equity_csv(&curve, &out).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,equity");
        assert_eq!(lines[1], "2024-01-15,1.000000");
        assert_eq!(lines[2], "2024-01-16,1.050000");
    }
}
