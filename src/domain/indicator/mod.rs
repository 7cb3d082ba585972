//! Technical indicators over close prices.
//!
//! Each indicator returns one `Option<f64>` per input value, `None` while the
//! window is still warming up, so outputs stay index-aligned with the bars.

pub mod sma;
