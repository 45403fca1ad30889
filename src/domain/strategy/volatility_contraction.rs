//! Volatility contraction (squeeze) breakout.
//!
//! A bar is squeezed when both the Bollinger band width and the ATR sit at or
//! below their percentile thresholds within the trailing lookback window. A
//! signal can only fire on the first bar after a squeeze run ends, and only in
//! the direction the close broke out of the bands on that bar. The release bar
//! consumes the squeeze either way; another squeeze must start before the next
//! signal.

use crate::domain::error::FxlabError;
use crate::domain::indicator::calculate_percent_rank;
use crate::domain::indicator_helpers::{add_atr, add_bollinger, BB_LOWER, BB_MIDDLE, BB_UPPER};
use crate::domain::signal::{Signal, SignalFrame};
use crate::domain::strategy::params::{ParamSpec, ParamValue};
use crate::domain::strategy::{window, OverlayColumns, Parameters, Strategy};

pub const BB_WIDTH_COLUMN: &str = "bb_width";
pub const BB_WIDTH_PCT_COLUMN: &str = "bb_width_pct";
pub const ATR_PCT_COLUMN: &str = "atr_pct";
pub const SQUEEZE_COLUMN: &str = "squeeze";

pub(crate) static SCHEMA: &[ParamSpec] = &[
    ParamSpec::int("bb_period", 20, Some(1.0), None),
    ParamSpec::float("bb_std", 2.0, Some(0.0), None),
    ParamSpec::int("atr_period", 14, Some(1.0), None),
    ParamSpec::int("squeeze_percentile", 20, Some(0.0), Some(100.0)),
    ParamSpec::int("atr_percentile", 25, Some(0.0), Some(100.0)),
    ParamSpec::int("lookback", 50, Some(1.0), None),
];

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityContraction {
    pub bb_period: i64,
    pub bb_std: f64,
    pub atr_period: i64,
    pub squeeze_percentile: i64,
    pub atr_percentile: i64,
    pub lookback: i64,
}

impl Default for VolatilityContraction {
    fn default() -> Self {
        Self {
            bb_period: 20,
            bb_std: 2.0,
            atr_period: 14,
            squeeze_percentile: 20,
            atr_percentile: 25,
            lookback: 50,
        }
    }
}

impl Strategy for VolatilityContraction {
    fn name(&self) -> &'static str {
        "Volatility Contraction"
    }

    fn description(&self) -> &'static str {
        "Detects volatility squeezes using Bollinger Band width and ATR \
         compression, then trades breakouts from the squeeze."
    }

    fn schema(&self) -> &'static [ParamSpec] {
        SCHEMA
    }

    fn parameters(&self) -> Parameters {
        vec![
            ("bb_period", ParamValue::Int(self.bb_period)),
            ("bb_std", ParamValue::Float(self.bb_std)),
            ("atr_period", ParamValue::Int(self.atr_period)),
            ("squeeze_percentile", ParamValue::Int(self.squeeze_percentile)),
            ("atr_percentile", ParamValue::Int(self.atr_percentile)),
            ("lookback", ParamValue::Int(self.lookback)),
        ]
    }

    fn assign(&mut self, name: &str, value: ParamValue) {
        match (name, value) {
            ("bb_period", ParamValue::Int(v)) => self.bb_period = v,
            ("bb_std", ParamValue::Float(v)) => self.bb_std = v,
            ("atr_period", ParamValue::Int(v)) => self.atr_period = v,
            ("squeeze_percentile", ParamValue::Int(v)) => self.squeeze_percentile = v,
            ("atr_percentile", ParamValue::Int(v)) => self.atr_percentile = v,
            ("lookback", ParamValue::Int(v)) => self.lookback = v,
            _ => {}
        }
    }

    fn overlay_columns(&self) -> OverlayColumns {
        let mut cols = OverlayColumns::new();
        cols.insert("bollinger", vec![BB_UPPER, BB_MIDDLE, BB_LOWER]);
        cols
    }

    fn generate_signals(&self, frame: &SignalFrame) -> Result<SignalFrame, FxlabError> {
        self.validate_parameters()?;

        let mut out = frame.clone();
        let bands = add_bollinger(&mut out, window(self.bb_period), self.bb_std)?;
        let width = bands.width();
        let atr = add_atr(&mut out, window(self.atr_period))?;

        let lookback = window(self.lookback);
        let width_pct = calculate_percent_rank(&width, lookback);
        let atr_pct = calculate_percent_rank(&atr, lookback);
        let squeeze = squeeze_flags(
            &width_pct,
            &atr_pct,
            self.squeeze_percentile as f64,
            self.atr_percentile as f64,
        );

        let closes: Vec<f64> = out.closes().collect();
        let signals = release_signals(&squeeze, &closes, &bands.upper, &bands.lower);

        out.insert_column(BB_WIDTH_COLUMN, width)?;
        out.insert_column(BB_WIDTH_PCT_COLUMN, width_pct)?;
        out.insert_column(ATR_PCT_COLUMN, atr_pct)?;
        out.insert_column(
            SQUEEZE_COLUMN,
            squeeze
                .iter()
                .map(|&s| Some(if s { 1.0 } else { 0.0 }))
                .collect(),
        )?;
        out.set_signals(signals)?;
        Ok(out)
    }
}

/// A bar is squeezed only when both percentiles are defined and at or below
/// their thresholds.
pub fn squeeze_flags(
    width_pct: &[Option<f64>],
    atr_pct: &[Option<f64>],
    width_threshold: f64,
    atr_threshold: f64,
) -> Vec<bool> {
    width_pct
        .iter()
        .zip(atr_pct)
        .map(|(w, a)| match (w, a) {
            (Some(w), Some(a)) => *w <= width_threshold && *a <= atr_threshold,
            _ => false,
        })
        .collect()
}

/// Signals on squeeze release bars (flag 1 -> 0) that closed outside the bands.
pub fn release_signals(
    squeeze: &[bool],
    closes: &[f64],
    upper: &[Option<f64>],
    lower: &[Option<f64>],
) -> Vec<Signal> {
    (0..squeeze.len())
        .map(|i| {
            if i == 0 || !squeeze[i - 1] || squeeze[i] {
                return Signal::Hold;
            }
            match (upper[i], lower[i]) {
                (Some(up), _) if closes[i] > up => Signal::Buy,
                (_, Some(low)) if closes[i] < low => Signal::Sell,
                _ => Signal::Hold,
            }
        })
        .collect()
}
