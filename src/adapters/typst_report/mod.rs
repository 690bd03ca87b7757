//! Typst report generation.
//!
//! Reads a Typst template (the built-in default or a custom file), resolves
//! its `{{PLACEHOLDER}}` markers with helpers from `chart_svg` and `tables`,
//! and writes the final `.typ` file.

pub mod chart_svg;
pub mod default_template;
pub mod style;
pub mod tables;

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::VolcrossError;
use crate::ports::report_port::ReportPort;

/// Resolve all `{{PLACEHOLDER}}`s in the given template and return the
/// final Typst markup.
pub fn resolve(template: &str, result: &BacktestResult, config: &BacktestConfig) -> String {
    let title = format!(
        "{} timing on {} below {:.0}",
        tables::escape(&config.ticker),
        tables::escape(&config.volatility_symbol),
        config.threshold
    );

    let equity_svg = chart_svg::generate_equity_svg(&result.equity_curve, &result.trades);
    let equity_typst = if equity_svg.is_empty() {
        "_No equity data._".to_string()
    } else {
        format!(
            "#image.decode(\n\"{}\",\n  width: 100%,\n)",
            equity_svg.replace('\\', "\\\\").replace('"', "\\\"")
        )
    };

    template
        .replace("{{TITLE}}", &title)
        .replace("{{PARAMETERS}}", &tables::format_parameters(config))
        .replace("{{SUMMARY}}", &tables::format_summary(result))
        .replace("{{EQUITY_CURVE_SVG}}", &equity_typst)
        .replace(
            "{{TRADE_LOG}}",
            &tables::format_trade_log(&result.trades, result.worst_mdd_date),
        )
        .replace(
            "{{CROSSING_LOG}}",
            &tables::format_crossing_log(&result.crossings),
        )
}

/// Writes reports with the built-in template unless a custom one is given.
#[derive(Debug, Default)]
pub struct TypstReportAdapter {
    template_path: Option<PathBuf>,
}

impl TypstReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template_path: PathBuf) -> Self {
        Self {
            template_path: Some(template_path),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), VolcrossError> {
        let custom;
        let template = match &self.template_path {
            Some(path) => {
                custom = fs::read_to_string(path)?;
                custom.as_str()
            }
            None => default_template::template(),
        };

        let content = resolve(template, result, config);
        fs::write(output_path, content)?;
        info!(path = output_path, "report written");
        Ok(())
    }
}
