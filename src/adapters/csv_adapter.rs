//! CSV directory data adapter.
//!
//! One `<TICKER>.csv` per instrument with a header row naming at least
//! `Date, Open, High, Low, Close, Volume` (any order, any case). Extra columns
//! such as `Adj Close` are ignored.

use crate::domain::error::SmacrossError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord, path: &str) -> Result<Self, SmacrossError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| SmacrossError::DataSource {
                    reason: format!("{}: missing {} column", path, name),
                })
        };

        Ok(Self {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, SmacrossError> {
        let path = self.csv_path(ticker);
        let display = path.display().to_string();
        let content = fs::read_to_string(&path).map_err(|e| SmacrossError::DataSource {
            reason: format!("failed to read {}: {}", display, e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| SmacrossError::DataSource {
            reason: format!("{}: CSV header error: {}", display, e),
        })?;
        let cols = Columns::resolve(headers, &display)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SmacrossError::DataSource {
                reason: format!("{}: CSV parse error: {}", display, e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let field = |idx: usize, name: &str| {
                record
                    .get(idx)
                    .map(str::trim)
                    .ok_or_else(|| SmacrossError::DataSource {
                        reason: format!("{} line {}: missing {} value", display, line, name),
                    })
            };
            let price = |idx: usize, name: &str| -> Result<f64, SmacrossError> {
                field(idx, name)?
                    .parse()
                    .map_err(|e| SmacrossError::DataSource {
                        reason: format!("{} line {}: invalid {} value: {}", display, line, name, e),
                    })
            };

            let date = parse_date(field(cols.date, "date")?).ok_or_else(|| {
                SmacrossError::DataSource {
                    reason: format!("{} line {}: invalid date", display, line),
                }
            })?;
            let volume = parse_volume(field(cols.volume, "volume")?).ok_or_else(|| {
                SmacrossError::DataSource {
                    reason: format!("{} line {}: invalid volume", display, line),
                }
            })?;

            bars.push(OhlcvBar {
                date,
                open: price(cols.open, "open")?,
                high: price(cols.high, "high")?,
                low: price(cols.low, "low")?,
                close: price(cols.close, "close")?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// `YYYY-MM-DD`, ignoring a time component separated by a space or `T`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    match value.as_bytes().get(10) {
        None | Some(b' ') | Some(b'T') => NaiveDate::parse_from_str(day, "%Y-%m-%d").ok(),
        Some(_) => None,
    }
}

/// Non-negative integer volume, also accepting integral floats like `1200.0`.
fn parse_volume(value: &str) -> Option<u64> {
    if let Ok(v) = value.parse::<u64>() {
        return Some(v);
    }
    let v: f64 = value.parse().ok()?;
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0).then_some(v as u64)
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SmacrossError> {
        let bars = self.read_bars(ticker)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start_date && b.date < end_date)
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SmacrossError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SmacrossError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(ticker) = name_str.strip_suffix(".csv") {
                symbols.push(ticker.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError> {
        if !self.csv_path(ticker).exists() {
            return Ok(None);
        }
        let bars = self.read_bars(ticker)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::write(
            dir.path().join("SPY.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,101.0,111.0,91.0,106.0,105.5,60000\n\
             2024-01-02,100.0,110.0,90.0,105.0,104.5,50000\n\
             2024-01-04,102.0,112.0,92.0,107.0,106.5,55000.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("QQQ.csv"),
            "volume,close,low,high,open,date\n\
             1000,50.5,49.0,51.0,50.0,2024-01-02 00:00:00\n",
        )
        .unwrap();
        fs::write(dir.path().join("EMPTY.csv"), "Date,Open,High,Low,Close,Volume\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        dir
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fetch_ohlcv_sorts_and_parses() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_ohlcv("SPY", d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, d(2024, 1, 2));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].volume, 55000);
    }

    #[test]
    fn fetch_ohlcv_end_date_is_exclusive() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_ohlcv("SPY", d(2024, 1, 3), d(2024, 1, 4)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d(2024, 1, 3));
    }

    #[test]
    fn columns_matched_by_name_in_any_order() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_ohlcv("QQQ", d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, d(2024, 1, 2));
        assert_eq!(bars[0].open, 50.0);
        assert_eq!(bars[0].close, 50.5);
        assert_eq!(bars[0].volume, 1000);
    }

    #[test]
    fn fetch_ohlcv_missing_file_is_error() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let result = adapter.fetch_ohlcv("XYZ", d(2024, 1, 1), d(2024, 2, 1));
        assert!(matches!(result, Err(SmacrossError::DataSource { .. })));
    }

    #[test]
    fn missing_column_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BAD.csv"), "Date,Open,High,Low,Close\n2024-01-02,1,1,1,1\n")
            .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter
            .fetch_ohlcv("BAD", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap_err();
        assert!(err.to_string().contains("missing volume column"));
    }

    #[test]
    fn invalid_price_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "Date,Open,High,Low,Close,Volume\n2024-01-02,1,1,1,abc,10\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter
            .fetch_ohlcv("BAD", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap_err();
        assert!(err.to_string().contains("invalid close value"));
    }

    #[test]
    fn list_symbols_only_csv_files() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(adapter.list_symbols().unwrap(), vec!["EMPTY", "QQQ", "SPY"]);
    }

    #[test]
    fn data_range_of_known_missing_and_empty() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        assert_eq!(
            adapter.get_data_range("SPY").unwrap(),
            Some((d(2024, 1, 2), d(2024, 1, 4), 3))
        );
        assert_eq!(adapter.get_data_range("XYZ").unwrap(), None);
        assert_eq!(adapter.get_data_range("EMPTY").unwrap(), None);
    }

    #[test]
    fn volume_parsing() {
        assert_eq!(parse_volume("42"), Some(42));
        assert_eq!(parse_volume("42.0"), Some(42));
        assert_eq!(parse_volume("42.5"), None);
        assert_eq!(parse_volume("-1"), None);
    }

    #[test]
    fn date_parsing_drops_time() {
        assert_eq!(parse_date("2024-03-05"), Some(d(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05T00:00:00-05:00"), Some(d(2024, 3, 5)));
        assert_eq!(parse_date("03/05/2024"), None);
        assert_eq!(parse_date("2024"), None);
    }

    #[test]
    fn date_with_trailing_junk_is_rejected() {
        assert_eq!(parse_date("2024-03-05garbage"), None);
        assert_eq!(parse_date("2024-03-051"), None);
        assert_eq!(parse_date("2024-03-05 09:30:00"), Some(d(2024, 3, 5)));
    }

    #[test]
    fn trailing_junk_date_fails_fetch() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "Date,Open,High,Low,Close,Volume\n2024-01-02x,1,1,1,1,10\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter
            .fetch_ohlcv("BAD", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }
}
