//! Configuration validation.
//!
//! Validates all `[backtest]` fields before a run starts.

use crate::domain::error::VolcrossError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SECTION: &str = "backtest";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), VolcrossError> {
    validate_ticker(config)?;
    validate_dates(config)?;
    validate_threshold(config)?;
    validate_day_counts(config)?;
    validate_stop_loss(config)?;
    Ok(())
}

fn invalid(key: &str, reason: &str) -> VolcrossError {
    VolcrossError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), VolcrossError> {
    match config.get_string(SECTION, "ticker") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(VolcrossError::ConfigMissing {
            section: SECTION.to_string(),
            key: "ticker".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), VolcrossError> {
    let start_date = parse_date(config.get_string(SECTION, "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string(SECTION, "end_date").as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(invalid("start_date", "start_date must be before end_date"));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, VolcrossError> {
    match value {
        None => Err(VolcrossError::ConfigMissing {
            section: SECTION.to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(field, &format!("invalid {} format, expected YYYY-MM-DD", field))
        }),
    }
}

fn validate_threshold(config: &dyn ConfigPort) -> Result<(), VolcrossError> {
    let value = config.get_double(SECTION, "threshold", 40.0)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("threshold", "threshold must be a positive number"));
    }
    Ok(())
}

/// Upper bound on every day count, roughly a century.
pub const MAX_DAY_COUNT: i64 = 36_500;

fn check_day_count(key: &str, value: i64, min: i64) -> Result<(), VolcrossError> {
    if !(min..=MAX_DAY_COUNT).contains(&value) {
        return Err(invalid(
            key,
            &format!("{key} must be between {min} and {MAX_DAY_COUNT}"),
        ));
    }
    Ok(())
}

fn validate_day_counts(config: &dyn ConfigPort) -> Result<(), VolcrossError> {
    let holding = config.get_int(SECTION, "holding_days", 252)?;
    check_day_count("holding_days", holding, 1)?;
    check_day_count("delay_days", config.get_int(SECTION, "delay_days", 30)?, 0)?;
    check_day_count(
        "cooldown_days",
        config.get_int(SECTION, "cooldown_days", holding)?,
        0,
    )?;
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), VolcrossError> {
    let value = config.get_double(SECTION, "stop_loss", 0.20)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid("stop_loss", "stop_loss must be between 0 and 1"));
    }
    Ok(())
}
