//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for volcross.
#[derive(Debug, thiserror::Error)]
pub enum VolcrossError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {points} points, need {minimum}")]
    InsufficientData {
        symbol: String,
        points: usize,
        minimum: usize,
    },

    #[error("series dates must be strictly increasing (offending date {date})")]
    SeriesOrder { date: NaiveDate },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VolcrossError {
    pub(crate) fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        VolcrossError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&VolcrossError> for std::process::ExitCode {
    fn from(err: &VolcrossError) -> Self {
        let code: u8 = match err {
            VolcrossError::Io(_) => 1,
            VolcrossError::ConfigParse { .. }
            | VolcrossError::ConfigMissing { .. }
            | VolcrossError::ConfigInvalid { .. } => 2,
            VolcrossError::DataUnavailable { .. }
            | VolcrossError::InsufficientData { .. }
            | VolcrossError::SeriesOrder { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
