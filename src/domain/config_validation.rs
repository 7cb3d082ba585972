//! Configuration validation and typed run configuration.
//!
//! Every key is checked before a run; the first offending key is reported.

use crate::domain::error::SmacrossError;
use crate::domain::evaluator::EvaluationConfig;
use crate::domain::metrics::DEFAULT_TRADING_DAYS_PER_YEAR;
use crate::domain::signal::TieBreak;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Everything a CLI run needs, resolved from the config file.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub charts: bool,
    pub parallel: bool,
    pub evaluation: EvaluationConfig,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    build_run_config(config).map(|_| ())
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, SmacrossError> {
    let data_dir = match config.get_string("data", "directory") {
        Some(d) if !d.trim().is_empty() => PathBuf::from(d.trim()),
        _ => return Err(SmacrossError::config_missing("data", "directory")),
    };

    let tickers = build_tickers(config)?;
    let (start_date, end_date) = build_dates(config)?;
    let evaluation = build_evaluation_config(config)?;

    let output_dir = config
        .get_string("output", "directory")
        .filter(|d| !d.trim().is_empty())
        .map(|d| PathBuf::from(d.trim()))
        .unwrap_or_else(|| PathBuf::from("outputs"));

    Ok(RunConfig {
        data_dir,
        output_dir,
        tickers,
        start_date,
        end_date,
        charts: config.get_bool("output", "charts", true),
        parallel: config.get_bool("output", "parallel", true),
        evaluation,
    })
}

pub fn build_evaluation_config(config: &dyn ConfigPort) -> Result<EvaluationConfig, SmacrossError> {
    let defaults = EvaluationConfig::default();

    let fast_window = parse_usize(config, "strategy", "fast_window", defaults.fast_window)?;
    let slow_window = parse_usize(config, "strategy", "slow_window", defaults.slow_window)?;
    let trading_days = parse_usize(
        config,
        "metrics",
        "trading_days_per_year",
        DEFAULT_TRADING_DAYS_PER_YEAR as usize,
    )?;
    let trading_days_per_year = u32::try_from(trading_days).map_err(|_| {
        SmacrossError::config_invalid("metrics", "trading_days_per_year", "value is too large")
    })?;

    let risk_free_rate = match config.get_string("metrics", "risk_free_rate") {
        None => defaults.risk_free_rate,
        Some(s) => s.trim().parse::<f64>().map_err(|_| {
            SmacrossError::config_invalid("metrics", "risk_free_rate", "expected a number")
        })?,
    };

    let tie_break = match config.get_string("strategy", "tie_break") {
        None => TieBreak::default(),
        Some(s) => s
            .parse::<TieBreak>()
            .map_err(|reason| SmacrossError::config_invalid("strategy", "tie_break", reason))?,
    };

    let evaluation = EvaluationConfig {
        fast_window,
        slow_window,
        trading_days_per_year,
        risk_free_rate,
        tie_break,
    };
    evaluation.validate()?;
    Ok(evaluation)
}

fn build_tickers(config: &dyn ConfigPort) -> Result<Vec<String>, SmacrossError> {
    let raw = config
        .get_string("backtest", "tickers")
        .or_else(|| config.get_string("backtest", "ticker"))
        .ok_or_else(|| SmacrossError::config_missing("backtest", "tickers"))?;

    parse_tickers(&raw)
        .map_err(|e| SmacrossError::config_invalid("backtest", "tickers", e.to_string()))
}

fn build_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), SmacrossError> {
    let start_date = parse_date(
        config.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        config.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    if start_date >= end_date {
        return Err(SmacrossError::config_invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok((start_date, end_date))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SmacrossError> {
    match value {
        None => Err(SmacrossError::config_missing("backtest", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SmacrossError::config_invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn parse_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SmacrossError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| {
                SmacrossError::config_invalid(section, key, "expected a non-negative integer")
            }),
    }
}
