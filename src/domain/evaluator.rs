//! Per-instrument strategy evaluation.
//!
//! `evaluate` is pure: the same series and config always produce bit-identical
//! results, and instruments share no state, so batches run in parallel.

use rayon::prelude::*;

use crate::domain::enrich::{EnrichedSeries, IndicatorFrame};
use crate::domain::error::SmacrossError;
use crate::domain::metrics::{DEFAULT_TRADING_DAYS_PER_YEAR, Metrics};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::TieBreak;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    pub fast_window: usize,
    pub slow_window: usize,
    pub trading_days_per_year: u32,
    /// Annual rate subtracted from CAGR in the Sharpe ratio.
    pub risk_free_rate: f64,
    pub tie_break: TieBreak,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            fast_window: 20,
            slow_window: 50,
            trading_days_per_year: DEFAULT_TRADING_DAYS_PER_YEAR,
            risk_free_rate: 0.0,
            tie_break: TieBreak::Flat,
        }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), SmacrossError> {
        if self.fast_window == 0 {
            return Err(SmacrossError::config_invalid(
                "strategy",
                "fast_window",
                "fast_window must be at least 1",
            ));
        }
        if self.fast_window >= self.slow_window {
            return Err(SmacrossError::config_invalid(
                "strategy",
                "slow_window",
                format!(
                    "slow_window ({}) must be greater than fast_window ({})",
                    self.slow_window, self.fast_window
                ),
            ));
        }
        if self.trading_days_per_year == 0 {
            return Err(SmacrossError::config_invalid(
                "metrics",
                "trading_days_per_year",
                "trading_days_per_year must be positive",
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(SmacrossError::config_invalid(
                "metrics",
                "risk_free_rate",
                "risk_free_rate must be a finite number",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub ticker: String,
    /// Rows left after warm-up trimming; zero means not enough history.
    pub row_count: usize,
    pub metrics: Metrics,
    pub series: EnrichedSeries,
}

impl EvaluationResult {
    pub fn has_history(&self) -> bool {
        self.row_count > 0
    }
}

pub fn evaluate(
    series: &PriceSeries,
    config: &EvaluationConfig,
) -> Result<EvaluationResult, SmacrossError> {
    config.validate()?;

    let frame = IndicatorFrame::compute(series, config.fast_window, config.slow_window);
    let trimmed = frame.trim();
    let enriched = EnrichedSeries::build(&trimmed, config.tie_break);
    let metrics = Metrics::compute(
        &enriched,
        config.trading_days_per_year,
        config.risk_free_rate,
    );

    Ok(EvaluationResult {
        ticker: series.ticker().to_string(),
        row_count: enriched.len(),
        metrics,
        series: enriched,
    })
}

/// Evaluate every series, in input order.
pub fn evaluate_all(
    series: &[PriceSeries],
    config: &EvaluationConfig,
    parallel: bool,
) -> Vec<Result<EvaluationResult, SmacrossError>> {
    if parallel {
        series.par_iter().map(|s| evaluate(s, config)).collect()
    } else {
        series.iter().map(|s| evaluate(s, config)).collect()
    }
}
