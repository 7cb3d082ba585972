//! Performance metrics for an enriched series.
//!
//! All degenerate inputs (no rows, zero variance) produce zeros instead of
//! NaN or division faults.

use crate::domain::enrich::EnrichedSeries;

pub const DEFAULT_TRADING_DAYS_PER_YEAR: u32 = 251;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub strategy_cagr: f64,
    pub buyhold_cagr: f64,
    pub strategy_total_return: f64,
    pub buyhold_total_return: f64,
    pub volatility: f64,
    pub buyhold_volatility: f64,
    pub sharpe_ratio: f64,
    pub buyhold_sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub buyhold_max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub exposure: f64,
    pub entries: usize,
}

impl Metrics {
    pub fn compute(
        series: &EnrichedSeries,
        trading_days_per_year: u32,
        risk_free_rate: f64,
    ) -> Self {
        let n = series.len();
        let strategy_equity = series.strategy_equity();
        let buyhold_equity = series.buyhold_equity();

        let strategy_cagr = cagr(&strategy_equity, trading_days_per_year);
        let buyhold_cagr = cagr(&buyhold_equity, trading_days_per_year);

        let volatility = annualized_volatility(&series.strategy_returns(), trading_days_per_year);
        let buyhold_volatility = annualized_volatility(&series.returns(), trading_days_per_year);

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&strategy_equity);
        let (buyhold_max_drawdown, _) = compute_drawdown(&buyhold_equity);

        let positions = series.positions();
        let days_in_market = positions.iter().filter(|&&p| p == 1).count();
        let exposure = if n > 0 {
            days_in_market as f64 / n as f64
        } else {
            0.0
        };
        let entries = positions
            .iter()
            .enumerate()
            .filter(|&(i, &p)| p == 1 && (i == 0 || positions[i - 1] == 0))
            .count();

        Metrics {
            strategy_cagr,
            buyhold_cagr,
            strategy_total_return: total_return(&strategy_equity),
            buyhold_total_return: total_return(&buyhold_equity),
            volatility,
            buyhold_volatility,
            sharpe_ratio: sharpe(strategy_cagr, volatility, risk_free_rate),
            buyhold_sharpe_ratio: sharpe(buyhold_cagr, buyhold_volatility, risk_free_rate),
            max_drawdown,
            buyhold_max_drawdown,
            max_drawdown_duration,
            exposure,
            entries,
        }
    }
}

fn total_return(equity: &[f64]) -> f64 {
    equity.last().map(|e| e - 1.0).unwrap_or(0.0)
}

/// Annualized growth over `len / trading_days_per_year` years.
pub fn cagr(equity: &[f64], trading_days_per_year: u32) -> f64 {
    let Some(&final_equity) = equity.last() else {
        return 0.0;
    };
    let years = equity.len() as f64 / f64::from(trading_days_per_year);
    final_equity.powf(1.0 / years) - 1.0
}

/// Sample standard deviation (n - 1 denominator); zero for fewer than two values.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

pub fn annualized_volatility(returns: &[f64], trading_days_per_year: u32) -> f64 {
    sample_stddev(returns) * f64::from(trading_days_per_year).sqrt()
}

/// Excess CAGR per unit of annualized volatility.
pub fn sharpe(cagr: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility != 0.0 {
        (cagr - risk_free_rate) / volatility
    } else {
        0.0
    }
}

/// Deepest decline from the running peak (<= 0) and the longest run of bars
/// spent below a peak.
pub fn compute_drawdown(equity: &[f64]) -> (f64, usize) {
    let Some(&first) = equity.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for &value in equity {
        if value >= peak {
            peak = value;
            current_duration = 0;
        } else {
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }

        let dd = value / peak - 1.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    (max_dd, max_duration)
}
