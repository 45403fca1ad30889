//! CSV candle adapter.
//!
//! Files are named `<INSTRUMENT>_<GRANULARITY>.csv` (e.g. `EUR_USD_1H.csv`)
//! and carry a `timestamp,open,high,low,close[,volume]` header. Columns are
//! looked up by name, so their order does not matter and extra columns are
//! ignored.

use crate::domain::error::FxlabError;
use crate::domain::instrument::Granularity;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str, granularity: Granularity) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", instrument.to_uppercase(), granularity.label()))
    }

    /// Reads a single candle file regardless of its name.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<OhlcvBar>, FxlabError> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;
        let bars = read_candles(file)?;
        debug!(path = %path.display(), bars = bars.len(), "loaded candles");
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
    ) -> Result<Vec<OhlcvBar>, FxlabError> {
        Self::load_file(self.csv_path(instrument, granularity))
    }

    fn list_instruments(&self, granularity: Granularity) -> Result<Vec<String>, FxlabError> {
        let suffix = format!("_{}.csv", granularity.label());
        let mut instruments = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(instrument) = name.strip_suffix(&suffix) {
                instruments.push(instrument.to_string());
            }
        }

        instruments.sort();
        Ok(instruments)
    }
}

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, FxlabError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| FxlabError::MissingColumn {
                column: name.to_string(),
            })
        };

        Ok(Self {
            timestamp: require("timestamp")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

/// Parses candles from CSV text and sorts them by timestamp.
pub fn read_candles<R: Read>(reader: R) -> Result<Vec<OhlcvBar>, FxlabError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut bars = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_error)?;
        let line = row + 2;

        let field = |index: usize, name: &str| {
            record.get(index).ok_or_else(|| FxlabError::Data {
                reason: format!("line {line}: missing {name} value"),
            })
        };
        let price = |index: usize, name: &str| -> Result<f64, FxlabError> {
            let raw = field(index, name)?;
            raw.parse().map_err(|_| FxlabError::Data {
                reason: format!("line {line}: invalid {name} value '{raw}'"),
            })
        };

        let timestamp = parse_timestamp(field(columns.timestamp, "timestamp")?).ok_or_else(|| {
            FxlabError::Data {
                reason: format!("line {line}: unrecognised timestamp"),
            }
        })?;

        let volume = match columns.volume {
            Some(i) if record.get(i).is_some_and(|raw| !raw.is_empty()) => {
                Some(price(i, "volume")?)
            }
            _ => None,
        };

        bars.push(OhlcvBar {
            timestamp,
            open: price(columns.open, "open")?,
            high: price(columns.high, "high")?,
            low: price(columns.low, "low")?,
            close: price(columns.close, "close")?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

/// RFC 3339 (normalised to UTC), `YYYY-MM-DD HH:MM:SS`, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn csv_error(e: csv::Error) -> FxlabError {
    FxlabError::Data {
        reason: format!("CSV parse error: {e}"),
    }
}
