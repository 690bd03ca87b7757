//! Report generation port trait.

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::VolcrossError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), VolcrossError>;
}
