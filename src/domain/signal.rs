//! Crossover signal and lagged position derivation.
//!
//! signal[i] = 1 if SMA_fast[i] > SMA_slow[i], else 0 (ties per [`TieBreak`]).
//! position[i] = signal[i-1], position[0] = 0: a decision made on bar i is held
//! from bar i+1 onwards.

use std::fmt;
use std::str::FromStr;

/// How a bar with `sma_fast == sma_slow` is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Equal averages mean no position.
    #[default]
    Flat,
    /// Equal averages keep the strategy long.
    Long,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(TieBreak::Flat),
            "long" => Ok(TieBreak::Long),
            other => Err(format!("unknown tie_break '{}', expected flat or long", other)),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Flat => write!(f, "flat"),
            TieBreak::Long => write!(f, "long"),
        }
    }
}

pub fn crossover_signal(sma_fast: f64, sma_slow: f64, tie_break: TieBreak) -> u8 {
    let long = sma_fast > sma_slow || (sma_fast == sma_slow && tie_break == TieBreak::Long);
    u8::from(long)
}

pub fn crossover_signals(sma_fast: &[f64], sma_slow: &[f64], tie_break: TieBreak) -> Vec<u8> {
    sma_fast
        .iter()
        .zip(sma_slow)
        .map(|(&fast, &slow)| crossover_signal(fast, slow, tie_break))
        .collect()
}

/// Shift signals one bar forward; the first bar has no prior signal to act on.
pub fn lagged_positions(signals: &[u8]) -> Vec<u8> {
    if signals.is_empty() {
        return Vec::new();
    }

    std::iter::once(0)
        .chain(signals[..signals.len() - 1].iter().copied())
        .collect()
}
