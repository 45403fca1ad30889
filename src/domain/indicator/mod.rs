//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values aligned to the bars
//!
//! A point with `valid == false` is "undefined": the rolling window has not
//! filled yet or the value is not computable. Undefined points never feed a
//! trading decision.

pub mod atr;
pub mod bollinger;
pub mod percent_rank;
pub mod rsi;

pub use atr::calculate_atr;
pub use bollinger::calculate_bollinger;
pub use percent_rank::calculate_percent_rank;
pub use rsi::calculate_rsi;

use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger { upper: f64, middle: f64, lower: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Atr(usize),
    Rsi(usize),
    Bollinger { period: usize, stddev_mult: f64 },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

/// Columns of a Bollinger series split out for display and signal logic.
#[derive(Debug, Clone, Default)]
pub struct BandColumns {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Values of a single-valued series, `None` where undefined.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| match p.value {
                IndicatorValue::Simple(v) if p.valid && v.is_finite() => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn band_columns(&self) -> BandColumns {
        let mut cols = BandColumns::default();
        for p in &self.values {
            match p.value {
                IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                } if p.valid => {
                    cols.upper.push(Some(upper));
                    cols.middle.push(Some(middle));
                    cols.lower.push(Some(lower));
                }
                _ => {
                    cols.upper.push(None);
                    cols.middle.push(None);
                    cols.lower.push(None);
                }
            }
        }
        cols
    }
}

impl BandColumns {
    /// upper - lower, undefined wherever the bands are.
    pub fn width(&self) -> Vec<Option<f64>> {
        self.upper
            .iter()
            .zip(&self.lower)
            .map(|(u, l)| match (u, l) {
                (Some(u), Some(l)) => Some(u - l),
                _ => None,
            })
            .collect()
    }
}
