#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fxlab::domain::backtest::BacktestConfig;
use fxlab::domain::error::FxlabError;
use fxlab::domain::instrument::Granularity;
pub use fxlab::domain::ohlcv::OhlcvBar;
use fxlab::domain::signal::{Signal, SignalFrame, ATR_COLUMN};
use fxlab::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;

pub struct MockDataPort {
    pub data: HashMap<(String, Granularity), Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, granularity: Granularity, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert((instrument.to_string(), granularity), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
    ) -> Result<Vec<OhlcvBar>, FxlabError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(FxlabError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(&(instrument.to_string(), granularity))
            .cloned()
            .unwrap_or_default())
    }

    fn list_instruments(&self, granularity: Granularity) -> Result<Vec<String>, FxlabError> {
        let mut instruments: Vec<String> = self
            .data
            .keys()
            .filter(|(_, g)| *g == granularity)
            .map(|(i, _)| i.clone())
            .collect();
        instruments.sort();
        Ok(instruments)
    }
}

/// Hourly timestamps from 2024-01-01 00:00.
pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i as i64)
}

pub fn make_bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: ts(i),
        open,
        high,
        low,
        close,
        volume: None,
    }
}

/// Bars whose range is `close ± half_range`.
pub fn bars_from_closes(closes: &[f64], half_range: f64) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, c + half_range, c - half_range, c))
        .collect()
}

/// A slow sine-like swing around 1.10, enough to push RSI to both extremes.
pub fn swing_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 1.10 + 0.01 * ((i as f64) * std::f64::consts::PI / 12.0).sin())
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        spread: 0.0,
        sl_atr_mult: 1.0,
        tp_atr_mult: 2.0,
        risk_pct: 0.01,
        initial_capital: 10_000.0,
    }
}

/// Frame with explicit signals and a constant ATR column.
pub fn signalled_frame(bars: Vec<OhlcvBar>, signals: Vec<Signal>, atr: f64) -> SignalFrame {
    let n = bars.len();
    SignalFrame::new(bars)
        .with_column(ATR_COLUMN, vec![Some(atr); n])
        .unwrap()
        .with_signals(signals)
        .unwrap()
}

pub fn write_temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn candles_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close
        ));
    }
    out
}
