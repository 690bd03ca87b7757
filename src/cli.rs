//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::csv_adapter::{write_equity_csv, CsvSeriesAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::backtest::{
    self as backtest_engine, BacktestConfig, BacktestResult, DEFAULT_VOLATILITY_SYMBOL,
};
use crate::domain::config_validation::{parse_date, validate_backtest_config, SECTION};
use crate::domain::error::VolcrossError;
use crate::domain::signal::CrossingOutcome;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::series_port::SeriesPort;

#[derive(Parser, Debug)]
#[command(
    name = "volcross",
    about = "Volatility-crossing timing backtester"
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the report
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [backtest] ticker
        #[arg(long)]
        ticker: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write the equity curve as CSV
        #[arg(long)]
        equity_csv: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List threshold crossings and what became of each
    Crossings {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match cli.command {
        Command::Backtest {
            config,
            ticker,
            output,
            equity_csv,
        } => run_backtest(
            &config,
            ticker.as_deref(),
            output.as_ref(),
            equity_csv.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Crossings { config } => run_crossings(&config),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    // Already initialised when run() is called more than once in-process.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = VolcrossError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// A config view where command-line flags win over file values.
pub struct ConfigOverrides<'a> {
    base: &'a dyn ConfigPort,
    ticker: Option<String>,
}

impl<'a> ConfigOverrides<'a> {
    pub fn new(base: &'a dyn ConfigPort, ticker: Option<&str>) -> Self {
        Self {
            base,
            ticker: ticker.map(str::to_string),
        }
    }
}

impl ConfigPort for ConfigOverrides<'_> {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        match (&self.ticker, section, key) {
            (Some(t), SECTION, "ticker") => Some(t.clone()),
            _ => self.base.get_string(section, key),
        }
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, VolcrossError> {
        self.base.get_int(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, VolcrossError> {
        self.base.get_double(section, key, default)
    }
}

/// Build run parameters from a config that has passed validation.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, VolcrossError> {
    let ticker = adapter
        .get_string(SECTION, "ticker")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| VolcrossError::ConfigMissing {
            section: SECTION.into(),
            key: "ticker".into(),
        })?;
    let volatility_symbol = adapter
        .get_string(SECTION, "volatility")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_VOLATILITY_SYMBOL.to_string());

    let start_date = parse_date(adapter.get_string(SECTION, "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(adapter.get_string(SECTION, "end_date").as_deref(), "end_date")?;
    let holding_days = adapter.get_int(SECTION, "holding_days", 252)?;

    Ok(BacktestConfig {
        ticker,
        volatility_symbol,
        start_date,
        end_date,
        threshold: adapter.get_double(SECTION, "threshold", 40.0)?,
        holding_days,
        delay_days: adapter.get_int(SECTION, "delay_days", 30)?,
        cooldown_days: adapter.get_int(SECTION, "cooldown_days", holding_days)?,
        stop_loss: adapter.get_double(SECTION, "stop_loss", 0.20)?,
    })
}

fn validated_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, ExitCode> {
    validate_backtest_config(adapter)
        .and_then(|_| build_backtest_config(adapter))
        .map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        })
}

fn data_path(adapter: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        adapter
            .get_string("data", "path")
            .unwrap_or_else(|| "data".to_string()),
    )
}

fn run_backtest(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    output_path: Option<&PathBuf>,
    equity_csv: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let file = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let adapter = ConfigOverrides::new(&file, ticker_override);

    // Stage 2: Validate and build parameters
    let bt_config = match validated_config(&adapter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 3: Resolve adapters and output paths
    let series = CsvSeriesAdapter::new(data_path(&adapter));
    let report = match adapter.get_string("report", "template_path") {
        Some(path) => TypstReportAdapter::with_template(PathBuf::from(path)),
        None => TypstReportAdapter::new(),
    };
    let output = output_path.cloned().unwrap_or_else(|| {
        PathBuf::from(
            adapter
                .get_string("report", "output")
                .unwrap_or_else(|| "report.typ".to_string()),
        )
    });

    run_backtest_pipeline(
        &series,
        &report,
        &bt_config,
        &output,
        equity_csv.map(PathBuf::as_path),
    )
}

/// Load data, run the engine, print the summary and write outputs.
pub fn run_backtest_pipeline(
    series: &dyn SeriesPort,
    report: &dyn ReportPort,
    bt_config: &BacktestConfig,
    output: &Path,
    equity_csv: Option<&Path>,
) -> ExitCode {
    match execute_backtest(series, report, bt_config, output, equity_csv) {
        Ok(_) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "backtest failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute_backtest(
    series: &dyn SeriesPort,
    report: &dyn ReportPort,
    bt_config: &BacktestConfig,
    output: &Path,
    equity_csv: Option<&Path>,
) -> Result<BacktestResult, VolcrossError> {
    eprintln!(
        "Running backtest: {} timed on {} < {}, {} to {}",
        bt_config.ticker,
        bt_config.volatility_symbol,
        bt_config.threshold,
        bt_config.start_date,
        bt_config.end_date,
    );

    let result = backtest_engine::run_from_port(series, bt_config)?;
    print_summary(&result);

    if let Some(path) = equity_csv {
        write_equity_csv(&result.equity_curve, path)?;
        eprintln!("Equity curve written to: {}", path.display());
    }

    report.write(&result, bt_config, &output.to_string_lossy())?;
    Ok(result)
}

fn fmt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn print_summary(result: &BacktestResult) {
    eprintln!("\n=== Results ===");
    eprintln!("Trades:           {}", result.trades.len());
    eprintln!("Stop-loss exits:  {}", result.stop_loss_exits());
    eprintln!("Cumulative:       {}", fmt_pct(result.cumulative_return_pct));
    eprintln!("Annualized:       {}", fmt_pct(result.expected_annual_return_pct));
    match result.worst_mdd_date {
        Some(date) => eprintln!(
            "Worst trade MDD:  {} (bought {})",
            fmt_pct(result.worst_mdd_pct),
            date
        ),
        None => eprintln!("Worst trade MDD:  n/a"),
    }

    if !result.trades.is_empty() {
        eprintln!("\n=== Trades ===");
        for t in &result.trades {
            eprintln!(
                "  {} -> {}  {:<9}  return {:>9}  mdd {:>9}",
                t.buy_date,
                t.sell_date,
                t.exit_reason.to_string(),
                fmt_pct(t.return_pct),
                fmt_pct(t.mdd_pct),
            );
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match validated_config(&adapter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("Config validated successfully");
    eprintln!("  Ticker:        {}", bt_config.ticker);
    eprintln!("  Volatility:    {}", bt_config.volatility_symbol);
    eprintln!(
        "  Period:        {} to {}",
        bt_config.start_date, bt_config.end_date
    );
    eprintln!("  Threshold:     {}", bt_config.threshold);
    eprintln!(
        "  Delay/Hold:    {} / {} days (cooldown {})",
        bt_config.delay_days, bt_config.holding_days, bt_config.cooldown_days
    );
    eprintln!("  Stop loss:     {:.1}%", bt_config.stop_loss * 100.0);
    ExitCode::SUCCESS
}

fn run_crossings(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let bt_config = match validated_config(&adapter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let series = CsvSeriesAdapter::new(data_path(&adapter));

    match crossing_report(&series, &bt_config) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// One line per threshold crossing, followed by a count of missed signals.
pub fn crossing_report(
    series: &dyn SeriesPort,
    bt_config: &BacktestConfig,
) -> Result<Vec<String>, VolcrossError> {
    let volatility = series.load(
        &bt_config.volatility_symbol,
        bt_config.start_date,
        bt_config.end_date,
    )?;
    let prices = series.load(&bt_config.ticker, bt_config.start_date, bt_config.end_date)?;
    let signals = backtest_engine::scan_signals(&volatility, &prices, bt_config)?;

    let mut lines: Vec<String> = signals
        .crossings
        .iter()
        .map(|r| {
            let marker = if r.outcome == CrossingOutcome::Admitted {
                "+"
            } else {
                "-"
            };
            format!(
                "{} {} {:.2} -> {:.2}  {}",
                marker, r.event.date, r.event.before, r.event.after, r.outcome
            )
        })
        .collect();
    lines.push(format!(
        "{} crossings, {} trades, {} missed",
        signals.crossings.len(),
        signals.trades.len(),
        signals.missed().count()
    ));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn overrides_replace_only_ticker() {
        let base = file("[backtest]\nticker = QLD\nthreshold = 35\n");
        let view = ConfigOverrides::new(&base, Some("TQQQ"));
        assert_eq!(view.get_string("backtest", "ticker"), Some("TQQQ".into()));
        assert_eq!(view.get_double("backtest", "threshold", 40.0).unwrap(), 35.0);
    }

    #[test]
    fn overrides_pass_through_without_flag() {
        let base = file("[backtest]\nticker = QLD\n");
        let view = ConfigOverrides::new(&base, None);
        assert_eq!(view.get_string("backtest", "ticker"), Some("QLD".into()));
    }

    #[test]
    fn data_path_defaults() {
        assert_eq!(data_path(&file("[backtest]\n")), PathBuf::from("data"));
        assert_eq!(
            data_path(&file("[data]\npath = /srv/prices\n")),
            PathBuf::from("/srv/prices")
        );
    }

    #[test]
    fn fmt_pct_handles_none() {
        assert_eq!(fmt_pct(Some(12.345)), "12.35%");
        assert_eq!(fmt_pct(None), "n/a");
    }
}
