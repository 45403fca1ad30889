//! RSI mean reversion with optional Bollinger Band confirmation.
//!
//! BUY when RSI < oversold, SELL when RSI > overbought. With confirmation on,
//! a BUY also needs close <= lower band and a SELL close >= upper band. The
//! bands are computed either way so they can be drawn.

use crate::domain::error::FxlabError;
use crate::domain::indicator::calculate_rsi;
use crate::domain::indicator_helpers::{add_bollinger, BB_LOWER, BB_MIDDLE, BB_UPPER};
use crate::domain::signal::{Signal, SignalFrame};
use crate::domain::strategy::params::{ParamSpec, ParamValue};
use crate::domain::strategy::{window, OverlayColumns, Parameters, Strategy};

pub const RSI_COLUMN: &str = "rsi";

pub(crate) static SCHEMA: &[ParamSpec] = &[
    ParamSpec::int("rsi_period", 14, Some(1.0), None),
    ParamSpec::int("rsi_oversold", 30, Some(0.0), Some(100.0)),
    ParamSpec::int("rsi_overbought", 70, Some(0.0), Some(100.0)),
    ParamSpec::flag("use_bollinger", true),
    ParamSpec::int("bb_period", 20, Some(1.0), None),
    ParamSpec::float("bb_std", 2.0, Some(0.0), None),
];

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversion {
    pub rsi_period: i64,
    pub rsi_oversold: i64,
    pub rsi_overbought: i64,
    pub use_bollinger: bool,
    pub bb_period: i64,
    pub bb_std: f64,
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_oversold: 30,
            rsi_overbought: 70,
            use_bollinger: true,
            bb_period: 20,
            bb_std: 2.0,
        }
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &'static str {
        "Mean Reversion"
    }

    fn description(&self) -> &'static str {
        "Trades mean reversion using RSI oversold/overbought levels, \
         optionally confirmed by Bollinger Band touches."
    }

    fn schema(&self) -> &'static [ParamSpec] {
        SCHEMA
    }

    fn parameters(&self) -> Parameters {
        vec![
            ("rsi_period", ParamValue::Int(self.rsi_period)),
            ("rsi_oversold", ParamValue::Int(self.rsi_oversold)),
            ("rsi_overbought", ParamValue::Int(self.rsi_overbought)),
            ("use_bollinger", ParamValue::Bool(self.use_bollinger)),
            ("bb_period", ParamValue::Int(self.bb_period)),
            ("bb_std", ParamValue::Float(self.bb_std)),
        ]
    }

    fn assign(&mut self, name: &str, value: ParamValue) {
        match (name, value) {
            ("rsi_period", ParamValue::Int(v)) => self.rsi_period = v,
            ("rsi_oversold", ParamValue::Int(v)) => self.rsi_oversold = v,
            ("rsi_overbought", ParamValue::Int(v)) => self.rsi_overbought = v,
            ("use_bollinger", ParamValue::Bool(v)) => self.use_bollinger = v,
            ("bb_period", ParamValue::Int(v)) => self.bb_period = v,
            ("bb_std", ParamValue::Float(v)) => self.bb_std = v,
            _ => {}
        }
    }

    fn overlay_columns(&self) -> OverlayColumns {
        let mut cols = OverlayColumns::new();
        cols.insert("rsi", vec![RSI_COLUMN]);
        if self.use_bollinger {
            cols.insert("bollinger", vec![BB_UPPER, BB_MIDDLE, BB_LOWER]);
        }
        cols
    }

    fn generate_signals(&self, frame: &SignalFrame) -> Result<SignalFrame, FxlabError> {
        self.validate_parameters()?;

        let mut out = frame.clone();
        let rsi = calculate_rsi(out.bars(), window(self.rsi_period)).simple_values();
        out.insert_column(RSI_COLUMN, rsi.clone())?;
        let bands = add_bollinger(&mut out, window(self.bb_period), self.bb_std)?;

        let oversold = self.rsi_oversold as f64;
        let overbought = self.rsi_overbought as f64;

        let signals = out
            .closes()
            .enumerate()
            .map(|(i, close)| {
                let Some(value) = rsi[i] else {
                    return Signal::Hold;
                };

                let mut buy = value < oversold;
                let mut sell = value > overbought;
                if self.use_bollinger {
                    buy = buy && bands.lower[i].is_some_and(|lower| close <= lower);
                    sell = sell && bands.upper[i].is_some_and(|upper| close >= upper);
                }

                // SELL wins if inverted thresholds make both true.
                if sell {
                    Signal::Sell
                } else if buy {
                    Signal::Buy
                } else {
                    Signal::Hold
                }
            })
            .collect();

        out.set_signals(signals)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::strategy::params::ParamInput;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn make_frame(prices: &[f64]) -> SignalFrame {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        SignalFrame::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, &close)| OhlcvBar {
                    timestamp: start + chrono::Duration::hours(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: None,
                })
                .collect(),
        )
    }

    fn params(pairs: &[(&str, ParamInput)]) -> HashMap<String, ParamInput> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Steady climb then a sharp drop: RSI goes overbought then oversold.
    fn swing_prices() -> Vec<f64> {
        let mut prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        prices.extend((1..=10).map(|i| 119.0 - 4.0 * i as f64));
        prices
    }

    #[test]
    fn default_parameters() {
        let s = MeanReversion::default();
        let params = s.parameters();
        assert_eq!(params.len(), 6);
        assert_eq!(params[0], ("rsi_period", ParamValue::Int(14)));
        assert_eq!(params[3], ("use_bollinger", ParamValue::Bool(true)));
        assert_eq!(params[5], ("bb_std", ParamValue::Float(2.0)));
    }

    #[test]
    fn schema_defaults_match_struct_defaults() {
        let s = MeanReversion::default();
        for (spec, (name, value)) in SCHEMA.iter().zip(s.parameters()) {
            assert_eq!(spec.name, name);
            assert_eq!(spec.default, value);
        }
    }

    #[test]
    fn signals_without_bollinger() {
        let mut s = MeanReversion::default();
        s.set_parameters(&params(&[("use_bollinger", "false".into())]))
            .unwrap();
        let out = s.generate_signals(&make_frame(&swing_prices())).unwrap();
        let signals = out.signals().unwrap();
        let rsi = out.column(RSI_COLUMN).unwrap();

        for (i, sig) in signals.iter().enumerate() {
            match rsi[i] {
                Some(v) if v > 70.0 => assert_eq!(*sig, Signal::Sell, "bar {}", i),
                Some(v) if v < 30.0 => assert_eq!(*sig, Signal::Buy, "bar {}", i),
                _ => assert_eq!(*sig, Signal::Hold, "bar {}", i),
            }
        }
        assert!(signals.contains(&Signal::Sell));
        assert!(signals.contains(&Signal::Buy));
    }

    #[test]
    fn bollinger_confirmation_filters_signals() {
        let frame = make_frame(&swing_prices());
        let mut plain = MeanReversion::default();
        plain.use_bollinger = false;
        let confirmed = MeanReversion::default();

        let plain_out = plain.generate_signals(&frame).unwrap();
        let confirmed_out = confirmed.generate_signals(&frame).unwrap();

        let lower = confirmed_out.column(BB_LOWER).unwrap();
        let upper = confirmed_out.column(BB_UPPER).unwrap();
        for (i, sig) in confirmed_out.signals().unwrap().iter().enumerate() {
            let close = frame.bars()[i].close;
            match sig {
                Signal::Buy => assert!(close <= lower[i].unwrap()),
                Signal::Sell => assert!(close >= upper[i].unwrap()),
                Signal::Hold => {}
            }
            if *sig != Signal::Hold {
                assert_eq!(*sig, plain_out.signals().unwrap()[i]);
            }
        }
    }

    #[test]
    fn bands_computed_even_without_confirmation() {
        let mut s = MeanReversion::default();
        s.use_bollinger = false;
        let out = s.generate_signals(&make_frame(&swing_prices())).unwrap();
        assert!(out.column(BB_UPPER).is_some());
        assert!(out.column(BB_MIDDLE).is_some());
        assert!(out.column(BB_LOWER).is_some());
        assert!(!s.overlay_columns().contains_key("bollinger"));
    }

    #[test]
    fn overlay_columns_with_bollinger() {
        let cols = MeanReversion::default().overlay_columns();
        assert_eq!(cols["rsi"], vec!["rsi"]);
        assert_eq!(cols["bollinger"], vec!["bb_upper", "bb_middle", "bb_lower"]);
    }

    #[test]
    fn warmup_bars_hold() {
        let out = MeanReversion::default()
            .generate_signals(&make_frame(&swing_prices()))
            .unwrap();
        assert!(out.signals().unwrap()[..14].iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn input_frame_untouched() {
        let frame = make_frame(&swing_prices());
        let _ = MeanReversion::default().generate_signals(&frame).unwrap();
        assert!(frame.signals().is_none());
        assert_eq!(frame.column_names().count(), 0);
    }

    #[test]
    fn set_parameters_coerces_text() {
        let mut s = MeanReversion::default();
        s.set_parameters(&params(&[
            ("rsi_period", "10".into()),
            ("bb_std", "2.5".into()),
            ("use_bollinger", "no".into()),
        ]))
        .unwrap();
        assert_eq!(s.rsi_period, 10);
        assert!((s.bb_std - 2.5).abs() < f64::EPSILON);
        assert!(!s.use_bollinger);
    }

    #[test]
    fn set_parameters_ignores_unknown_keys() {
        let mut s = MeanReversion::default();
        s.set_parameters(&params(&[("lookback", "5".into()), ("rsi_oversold", ParamInput::Int(25))]))
            .unwrap();
        assert_eq!(s.rsi_oversold, 25);
        assert_eq!(s, MeanReversion { rsi_oversold: 25, ..MeanReversion::default() });
    }

    #[test]
    fn set_parameters_failure_is_atomic() {
        let mut s = MeanReversion::default();
        let err = s
            .set_parameters(&params(&[
                ("rsi_oversold", "20".into()),
                ("rsi_period", "abc".into()),
            ]))
            .unwrap_err();
        assert!(matches!(err, FxlabError::ParamCoercion { .. }));
        assert_eq!(s, MeanReversion::default());
    }

    #[test]
    fn negative_period_accepted_then_rejected_on_generate() {
        let mut s = MeanReversion::default();
        s.set_parameters(&params(&[("rsi_period", ParamInput::Int(-3))]))
            .unwrap();
        assert_eq!(s.rsi_period, -3);

        let err = s.generate_signals(&make_frame(&swing_prices())).unwrap_err();
        assert!(matches!(err, FxlabError::ParamOutOfRange { ref key, .. } if key == "rsi_period"));
    }

    #[test]
    fn empty_frame_yields_empty_signals() {
        let out = MeanReversion::default()
            .generate_signals(&make_frame(&[]))
            .unwrap();
        assert_eq!(out.signals().unwrap().len(), 0);
    }
}
