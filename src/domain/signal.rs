//! Per-bar signals and the signal frame a strategy produces.
//!
//! A [`SignalFrame`] owns its bars and any derived columns. Strategies read a
//! frame and return a new one; the caller's frame is never touched.

use std::collections::BTreeMap;

use crate::domain::error::FxlabError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Signal::Sell),
            0 => Some(Signal::Hold),
            1 => Some(Signal::Buy),
            _ => None,
        }
    }

    /// Direction of the position this signal asks for, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Signal::Buy => Some(Direction::Long),
            Signal::Sell => Some(Direction::Short),
            Signal::Hold => None,
        }
    }
}

/// A numeric column aligned with the bars; `None` marks an undefined value.
pub type Column = Vec<Option<f64>>;

pub const SIGNAL_COLUMN: &str = "signal";
pub const ATR_COLUMN: &str = "atr";

#[derive(Debug, Clone, Default)]
pub struct SignalFrame {
    bars: Vec<OhlcvBar>,
    signals: Option<Vec<Signal>>,
    columns: BTreeMap<String, Column>,
}

impl SignalFrame {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        Self {
            bars,
            signals: None,
            columns: BTreeMap::new(),
        }
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

    pub fn signals(&self) -> Option<&[Signal]> {
        self.signals.as_deref()
    }

    pub fn set_signals(&mut self, signals: Vec<Signal>) -> Result<(), FxlabError> {
        self.check_len(SIGNAL_COLUMN, signals.len())?;
        self.signals = Some(signals);
        Ok(())
    }

    pub fn with_signals(mut self, signals: Vec<Signal>) -> Result<Self, FxlabError> {
        self.set_signals(signals)?;
        Ok(self)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Adds or replaces a derived column.
    pub fn insert_column(&mut self, name: &str, values: Column) -> Result<(), FxlabError> {
        self.check_len(name, values.len())?;
        self.columns.insert(name.to_string(), values);
        Ok(())
    }

    pub fn with_column(mut self, name: &str, values: Column) -> Result<Self, FxlabError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }

    fn check_len(&self, column: &str, actual: usize) -> Result<(), FxlabError> {
        if actual != self.bars.len() {
            return Err(FxlabError::LengthMismatch {
                column: column.to_string(),
                expected: self.bars.len(),
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(n: usize) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| OhlcvBar {
                timestamp: start + chrono::Duration::hours(i as i64),
                open: 1.1,
                high: 1.1,
                low: 1.1,
                close: 1.1,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn signal_integer_mapping() {
        assert_eq!(Signal::Sell.as_i8(), -1);
        assert_eq!(Signal::Hold.as_i8(), 0);
        assert_eq!(Signal::Buy.as_i8(), 1);
        assert_eq!(Signal::from_i8(1), Some(Signal::Buy));
        assert_eq!(Signal::from_i8(2), None);
    }

    #[test]
    fn signal_direction() {
        assert_eq!(Signal::Buy.direction(), Some(Direction::Long));
        assert_eq!(Signal::Sell.direction(), Some(Direction::Short));
        assert_eq!(Signal::Hold.direction(), None);
    }

    #[test]
    fn new_frame_has_no_signal_column() {
        let frame = SignalFrame::new(make_bars(3));
        assert!(frame.signals().is_none());
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn signals_must_match_bar_count() {
        let frame = SignalFrame::new(make_bars(3));
        let err = frame.with_signals(vec![Signal::Hold; 2]).unwrap_err();
        assert!(matches!(
            err,
            FxlabError::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn insert_column_replaces_existing() {
        let mut frame = SignalFrame::new(make_bars(2));
        frame.insert_column("atr", vec![None, Some(1.0)]).unwrap();
        frame.insert_column("atr", vec![Some(2.0), Some(3.0)]).unwrap();
        assert_eq!(frame.column("atr").unwrap(), &[Some(2.0), Some(3.0)]);
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["atr"]);
    }

    #[test]
    fn clones_do_not_alias() {
        let mut original = SignalFrame::new(make_bars(2));
        original.insert_column("rsi", vec![None, Some(40.0)]).unwrap();
        let mut copy = original.clone();
        copy.insert_column("rsi", vec![None, None]).unwrap();
        assert_eq!(original.column("rsi").unwrap(), &[None, Some(40.0)]);
    }
}
