//! Staged construction of the enriched series.
//!
//! Each stage is an immutable value built from the previous one:
//! `PriceSeries` -> [`IndicatorFrame`] -> [`TrimmedFrame`] -> [`EnrichedSeries`].

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::domain::signal::{TieBreak, crossover_signals, lagged_positions};

/// Simple close-to-close returns; the first bar has none.
pub fn simple_returns(closes: &[f64]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(closes.windows(2).map(|w| Some(w[1] / w[0] - 1.0)))
        .take(closes.len())
        .collect()
}

/// Number of leading rows dropped before any row has a return and both averages.
pub fn warmup_rows(fast_window: usize, slow_window: usize) -> usize {
    fast_window.max(slow_window).saturating_sub(1).max(1)
}

/// Untrimmed bars with returns and both moving averages.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub bars: Vec<OhlcvBar>,
    pub returns: Vec<Option<f64>>,
    pub sma_fast: Vec<Option<f64>>,
    pub sma_slow: Vec<Option<f64>>,
    fast_window: usize,
    slow_window: usize,
}

impl IndicatorFrame {
    pub fn compute(series: &PriceSeries, fast_window: usize, slow_window: usize) -> Self {
        let closes = series.closes();
        Self {
            returns: simple_returns(&closes),
            sma_fast: rolling_mean(&closes, fast_window),
            sma_slow: rolling_mean(&closes, slow_window),
            bars: series.bars().to_vec(),
            fast_window,
            slow_window,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Drop the warm-up rows and re-base the remainder at index zero.
    pub fn trim(&self) -> TrimmedFrame {
        let offset = warmup_rows(self.fast_window, self.slow_window);

        let rows = (offset..self.len())
            .filter_map(|i| {
                let ret = self.returns[i]?;
                let sma_fast = self.sma_fast[i]?;
                let sma_slow = self.sma_slow[i]?;
                Some(TrimmedRow {
                    bar: self.bars[i].clone(),
                    ret,
                    sma_fast,
                    sma_slow,
                })
            })
            .collect();

        TrimmedFrame { rows, offset }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedRow {
    pub bar: OhlcvBar,
    pub ret: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
}

/// Rows with every input field defined, indexed from zero.
#[derive(Debug, Clone)]
pub struct TrimmedFrame {
    pub rows: Vec<TrimmedRow>,
    /// Index in the untrimmed series of `rows[0]`.
    pub offset: usize,
}

impl TrimmedFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub bar: OhlcvBar,
    pub ret: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub signal: u8,
    pub position: u8,
    pub strategy_return: f64,
    pub buyhold_equity: f64,
    pub strategy_equity: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedSeries {
    pub rows: Vec<EnrichedRow>,
}

impl EnrichedSeries {
    pub fn build(frame: &TrimmedFrame, tie_break: TieBreak) -> Self {
        let fast: Vec<f64> = frame.rows.iter().map(|r| r.sma_fast).collect();
        let slow: Vec<f64> = frame.rows.iter().map(|r| r.sma_slow).collect();
        let signals = crossover_signals(&fast, &slow, tie_break);
        let positions = lagged_positions(&signals);

        let mut buyhold_equity = 1.0;
        let mut strategy_equity = 1.0;
        let mut rows = Vec::with_capacity(frame.len());

        for ((row, signal), position) in frame.rows.iter().zip(signals).zip(positions) {
            let strategy_return = f64::from(position) * row.ret;
            buyhold_equity *= 1.0 + row.ret;
            strategy_equity *= 1.0 + strategy_return;

            rows.push(EnrichedRow {
                bar: row.bar.clone(),
                ret: row.ret,
                sma_fast: row.sma_fast,
                sma_slow: row.sma_slow,
                signal,
                position,
                strategy_return,
                buyhold_equity,
                strategy_equity,
            });
        }

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ret).collect()
    }

    pub fn strategy_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strategy_return).collect()
    }

    pub fn buyhold_equity(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.buyhold_equity).collect()
    }

    pub fn strategy_equity(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strategy_equity).collect()
    }

    pub fn signals(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.signal).collect()
    }

    pub fn positions(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.position).collect()
    }
}
