//! CSV report adapter implementing ReportPort.
//!
//! Writes `<TICKER>_evaluation.csv` with the enriched series, `summary.csv`
//! with the headline metrics per ticker and `summary_detail.csv` with the
//! buy-and-hold counterparts, drawdown duration and trading activity.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::SmacrossError;
use crate::domain::evaluator::EvaluationResult;
use crate::ports::report_port::ReportPort;

const SERIES_HEADER: [&str; 14] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "return",
    "sma_fast",
    "sma_slow",
    "signal",
    "position",
    "strategy_return",
    "buyhold_equity",
    "strategy_equity",
];

const SUMMARY_HEADER: [&str; 7] = [
    "ticker",
    "strategy_cagr",
    "buyhold_cagr",
    "volatility",
    "sharpe",
    "max_drawdown",
    "rows",
];

const DETAIL_HEADER: [&str; 9] = [
    "ticker",
    "strategy_total_return",
    "buyhold_total_return",
    "buyhold_volatility",
    "buyhold_sharpe",
    "buyhold_max_drawdown",
    "max_drawdown_duration",
    "exposure",
    "entries",
];

pub struct CsvReportAdapter;

pub fn instrument_path(output_dir: &Path, ticker: &str) -> PathBuf {
    output_dir.join(format!("{}_evaluation.csv", ticker))
}

pub fn summary_path(output_dir: &Path) -> PathBuf {
    output_dir.join("summary.csv")
}

pub fn detail_path(output_dir: &Path) -> PathBuf {
    output_dir.join("summary_detail.csv")
}

fn export_err(path: &Path, e: impl std::fmt::Display) -> SmacrossError {
    SmacrossError::Export {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn open_writer(path: &Path) -> Result<csv::Writer<fs::File>, SmacrossError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| export_err(path, e))?;
    }
    csv::Writer::from_path(path).map_err(|e| export_err(path, e))
}

impl ReportPort for CsvReportAdapter {
    fn write_instrument(
        &self,
        result: &EvaluationResult,
        output_dir: &Path,
    ) -> Result<(), SmacrossError> {
        let path = instrument_path(output_dir, &result.ticker);
        let mut wtr = open_writer(&path)?;
        wtr.write_record(SERIES_HEADER)
            .map_err(|e| export_err(&path, e))?;

        for row in &result.series.rows {
            wtr.write_record([
                row.bar.date.to_string(),
                row.bar.open.to_string(),
                row.bar.high.to_string(),
                row.bar.low.to_string(),
                row.bar.close.to_string(),
                row.bar.volume.to_string(),
                row.ret.to_string(),
                row.sma_fast.to_string(),
                row.sma_slow.to_string(),
                row.signal.to_string(),
                row.position.to_string(),
                row.strategy_return.to_string(),
                row.buyhold_equity.to_string(),
                row.strategy_equity.to_string(),
            ])
            .map_err(|e| export_err(&path, e))?;
        }

        wtr.flush().map_err(|e| export_err(&path, e))
    }

    fn write_summary(
        &self,
        results: &[EvaluationResult],
        output_dir: &Path,
    ) -> Result<(), SmacrossError> {
        let path = summary_path(output_dir);
        let mut wtr = open_writer(&path)?;
        wtr.write_record(SUMMARY_HEADER)
            .map_err(|e| export_err(&path, e))?;

        for result in results {
            let m = &result.metrics;
            wtr.write_record([
                result.ticker.clone(),
                m.strategy_cagr.to_string(),
                m.buyhold_cagr.to_string(),
                m.volatility.to_string(),
                m.sharpe_ratio.to_string(),
                m.max_drawdown.to_string(),
                result.row_count.to_string(),
            ])
            .map_err(|e| export_err(&path, e))?;
        }
        wtr.flush().map_err(|e| export_err(&path, e))?;

        write_detail(results, output_dir)
    }
}

fn write_detail(results: &[EvaluationResult], output_dir: &Path) -> Result<(), SmacrossError> {
    let path = detail_path(output_dir);
    let mut wtr = open_writer(&path)?;
    wtr.write_record(DETAIL_HEADER)
        .map_err(|e| export_err(&path, e))?;

    for result in results {
        let m = &result.metrics;
        wtr.write_record([
            result.ticker.clone(),
            m.strategy_total_return.to_string(),
            m.buyhold_total_return.to_string(),
            m.buyhold_volatility.to_string(),
            m.buyhold_sharpe_ratio.to_string(),
            m.buyhold_max_drawdown.to_string(),
            m.max_drawdown_duration.to_string(),
            m.exposure.to_string(),
            m.entries.to_string(),
        ])
        .map_err(|e| export_err(&path, e))?;
    }

    wtr.flush().map_err(|e| export_err(&path, e))
}
