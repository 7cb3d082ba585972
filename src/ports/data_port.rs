//! Price data access port.

use crate::domain::error::SmacrossError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `ticker` with `start_date <= date < end_date`, sorted by date.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SmacrossError>;

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError>;

    /// First date, last date and bar count of everything stored for `ticker`.
    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError>;
}
