//! OHLCV bar and validated per-instrument price series.

use crate::domain::error::SmacrossError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars for one instrument.
///
/// Dates are strictly increasing and every price is finite and positive.
/// Gaps between dates are allowed and are not interpolated.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, SmacrossError> {
        let ticker = ticker.into();
        let invalid = |reason: String| SmacrossError::InvalidInput {
            ticker: ticker.clone(),
            reason,
        };

        if bars.is_empty() {
            return Err(invalid("series is empty".into()));
        }

        for (i, bar) in bars.iter().enumerate() {
            let prices = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ];
            for (name, value) in prices {
                if !value.is_finite() || value <= 0.0 {
                    return Err(invalid(format!(
                        "non-positive {} {} on {}",
                        name, value, bar.date
                    )));
                }
            }

            if i > 0 {
                let prev = bars[i - 1].date;
                if bar.date == prev {
                    return Err(invalid(format!("duplicate date {}", bar.date)));
                }
                if bar.date < prev {
                    return Err(invalid(format!(
                        "dates out of order: {} follows {}",
                        bar.date, prev
                    )));
                }
            }
        }

        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }
}
