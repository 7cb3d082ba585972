//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::config_validation::{RunConfig, build_run_config};
use crate::domain::error::SmacrossError;
use crate::domain::evaluator::{EvaluationResult, evaluate_all};
use crate::domain::universe::{load_universe, parse_tickers};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "smacross",
    about = "Moving-average crossover strategy evaluator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the strategy for every configured ticker
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluate only this ticker (or comma-separated list)
        #[arg(long)]
        ticker: Option<String>,
        /// Output directory, overriding [output] directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip SVG chart output
        #[arg(long)]
        no_charts: bool,
        /// Validate config and list what would run
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the stored data range per ticker
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Evaluate {
            config,
            ticker,
            output,
            no_charts,
            dry_run,
        } => run_evaluate(&config, ticker.as_deref(), output, no_charts, dry_run),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SmacrossError> {
    FileConfigAdapter::from_file(path).map_err(|e| SmacrossError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn load_run_config(path: &Path) -> Result<RunConfig, SmacrossError> {
    info!("loading config from {}", path.display());
    let adapter = load_config(path)?;
    build_run_config(&adapter)
}

/// Tickers from `--ticker` when given, otherwise from the config.
pub fn resolve_tickers(
    ticker_override: Option<&str>,
    run_config: &RunConfig,
) -> Result<Vec<String>, SmacrossError> {
    match ticker_override {
        Some(t) => parse_tickers(t).map_err(|e| SmacrossError::ConfigInvalid {
            section: "cli".into(),
            key: "ticker".into(),
            reason: e.to_string(),
        }),
        None => Ok(run_config.tickers.clone()),
    }
}

fn run_evaluate(
    config_path: &Path,
    ticker_override: Option<&str>,
    output_override: Option<PathBuf>,
    no_charts: bool,
    dry_run: bool,
) -> Result<(), SmacrossError> {
    let mut run_config = load_run_config(config_path)?;
    run_config.tickers = resolve_tickers(ticker_override, &run_config)?;
    if let Some(dir) = output_override {
        run_config.output_dir = dir;
    }
    if no_charts {
        run_config.charts = false;
    }

    if dry_run {
        println!("{}", describe_run(&run_config));
        info!("dry run complete: configuration is valid");
        return Ok(());
    }

    let data_port = CsvAdapter::new(run_config.data_dir.clone());
    let csv_report = CsvReportAdapter;
    let charts = SvgChartAdapter;
    let mut reports: Vec<&dyn ReportPort> = vec![&csv_report];
    if run_config.charts {
        reports.push(&charts);
    }

    let results = run_evaluation(&data_port, &reports, &run_config)?;
    println!("{}", format_summary(&results));
    info!("results written to {}", run_config.output_dir.display());
    Ok(())
}

/// Load, evaluate and report every ticker of `run_config`.
pub fn run_evaluation(
    data_port: &dyn DataPort,
    reports: &[&dyn ReportPort],
    run_config: &RunConfig,
) -> Result<Vec<EvaluationResult>, SmacrossError> {
    info!(
        "evaluating {} tickers from {} to {}",
        run_config.tickers.len(),
        run_config.start_date,
        run_config.end_date
    );
    let universe = load_universe(
        data_port,
        &run_config.tickers,
        run_config.start_date,
        run_config.end_date,
    )?;

    let eval = &run_config.evaluation;
    info!(
        "SMA({}) / SMA({}), {} trading days per year, ties {}",
        eval.fast_window, eval.slow_window, eval.trading_days_per_year, eval.tie_break
    );

    let results = evaluate_all(&universe.series, eval, run_config.parallel)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    for result in &results {
        if !result.has_history() {
            warn!(
                "{}: insufficient history for SMA({}), metrics are zero",
                result.ticker, eval.slow_window
            );
        }
    }

    for report in reports {
        report.write_all(&results, &run_config.output_dir)?;
    }

    Ok(results)
}

pub fn describe_run(run_config: &RunConfig) -> String {
    let eval = &run_config.evaluation;
    let mut lines = vec![
        format!("data:          {}", run_config.data_dir.display()),
        format!("output:        {}", run_config.output_dir.display()),
        format!("tickers:       {}", run_config.tickers.join(", ")),
        format!(
            "period:        {} to {}",
            run_config.start_date, run_config.end_date
        ),
        format!(
            "windows:       fast {} / slow {}",
            eval.fast_window, eval.slow_window
        ),
        format!("trading days:  {}", eval.trading_days_per_year),
        format!("risk free:     {}", eval.risk_free_rate),
        format!("tie break:     {}", eval.tie_break),
    ];
    lines.push(format!(
        "charts:        {}",
        if run_config.charts { "yes" } else { "no" }
    ));
    lines.join("\n")
}

pub fn format_summary(results: &[EvaluationResult]) -> String {
    let mut out = format!(
        "{:<8} {:>10} {:>10} {:>10} {:>8} {:>10} {:>8} {:>7} {:>6}",
        "Ticker",
        "Strat CAGR",
        "B&H CAGR",
        "Vol",
        "Sharpe",
        "Max DD",
        "Exposure",
        "Entries",
        "Rows",
    );
    for r in results {
        let m = &r.metrics;
        out.push_str(&format!(
            "\n{:<8} {:>9.2}% {:>9.2}% {:>9.2}% {:>8.2} {:>9.2}% {:>7.1}% {:>7} {:>6}",
            r.ticker,
            m.strategy_cagr * 100.0,
            m.buyhold_cagr * 100.0,
            m.volatility * 100.0,
            m.sharpe_ratio,
            m.max_drawdown * 100.0,
            m.exposure * 100.0,
            m.entries,
            r.row_count
        ));
    }
    out
}

fn run_validate(config_path: &Path) -> Result<(), SmacrossError> {
    let run_config = load_run_config(config_path)?;
    println!("{}", describe_run(&run_config));
    info!("configuration is valid");
    Ok(())
}

fn run_info(config_path: &Path, ticker_override: Option<&str>) -> Result<(), SmacrossError> {
    let run_config = load_run_config(config_path)?;
    let tickers = resolve_tickers(ticker_override, &run_config)?;
    let data_port = CsvAdapter::new(run_config.data_dir.clone());

    for line in data_range_lines(&data_port, &tickers) {
        println!("{}", line);
    }
    Ok(())
}

pub fn data_range_lines(data_port: &dyn DataPort, tickers: &[String]) -> Vec<String> {
    tickers
        .iter()
        .map(|t| match data_port.get_data_range(t) {
            Ok(Some((first, last, count))) => {
                format!("{}: {} bars, {} to {}", t, count, first, last)
            }
            Ok(None) => format!("{}: no data found", t),
            Err(e) => format!("{}: error: {}", t, e),
        })
        .collect()
}
