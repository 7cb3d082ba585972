//! Ticker universe: parsing the configured list and loading each price series.
//!
//! Tickers that cannot be fetched or fail validation are skipped with a
//! warning; loading fails only when nothing is left.

use crate::domain::error::SmacrossError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[derive(Debug, Clone)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    NoData,
    InvalidSeries(String),
}

#[derive(Debug)]
pub struct LoadedUniverse {
    pub series: Vec<PriceSeries>,
    pub skipped: Vec<SkippedTicker>,
}

pub fn load_universe(
    data_port: &dyn DataPort,
    tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<LoadedUniverse, SmacrossError> {
    let mut series = Vec::with_capacity(tickers.len());
    let mut skipped = Vec::new();

    for ticker in tickers {
        debug!("fetching {} from {} to {}", ticker, start_date, end_date);
        let bars = match data_port.fetch_ohlcv(ticker, start_date, end_date) {
            Ok(bars) => bars,
            Err(e) => {
                warn!("skipping {} ({})", ticker, e);
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                continue;
            }
        };

        if bars.is_empty() {
            warn!("skipping {} (no data between {} and {})", ticker, start_date, end_date);
            skipped.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        }

        match PriceSeries::new(ticker.clone(), bars) {
            Ok(s) => {
                info!("{}: {} bars [OK]", ticker, s.len());
                series.push(s);
            }
            Err(e) => {
                warn!("skipping {} ({})", ticker, e);
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: SkipReason::InvalidSeries(e.to_string()),
                });
            }
        }
    }

    if series.is_empty() {
        return Err(SmacrossError::NoData {
            ticker: tickers.join(","),
        });
    }

    if !skipped.is_empty() {
        info!("evaluating {} of {} tickers", series.len(), tickers.len());
    }

    Ok(LoadedUniverse { series, skipped })
}
