//! Bollinger Bands over closes.
//!
//! The middle band is the trailing mean of `period` closes; the outer bands
//! sit `stddev_mult` population standard deviations either side of it.
//! The first `period - 1` points are undefined, and every point is undefined
//! for a zero period or a period longer than the series.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_bollinger(bars: &[OhlcvBar], period: usize, stddev_mult: f64) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let mut bands: Vec<Option<(f64, f64, f64)>> = vec![None; bars.len()];

    if period > 0 {
        for (end, window) in (period - 1..).zip(closes.windows(period)) {
            let (mean, deviation) = mean_and_deviation(window);
            let offset = stddev_mult * deviation;
            bands[end] = Some((mean + offset, mean, mean - offset));
        }
    }

    let values = bars
        .iter()
        .zip(bands)
        .map(|(bar, band)| {
            let (upper, middle, lower) = band.unwrap_or_default();
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: band.is_some(),
                value: IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult,
        },
        values,
    }
}

/// Mean and population standard deviation (divides by N).
fn mean_and_deviation(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn hourly(closes: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: start + chrono::Duration::hours(i as i64),
                open: close,
                high: close + 0.0005,
                low: close - 0.0005,
                close,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn undefined_until_window_fills() {
        let bars = hourly(&[1.10, 1.11, 1.12, 1.13, 1.14, 1.15]);
        let cols = calculate_bollinger(&bars, 4, 2.0).band_columns();

        let defined: Vec<bool> = cols.middle.iter().map(Option::is_some).collect();
        assert_eq!(defined, vec![false, false, false, true, true, true]);
        assert_eq!(cols.upper.len(), 6);
        assert_eq!(cols.lower.len(), 6);
    }

    #[test]
    fn window_of_three_closes() {
        let bars = hourly(&[1.10, 1.12, 1.14]);
        let cols = calculate_bollinger(&bars, 3, 2.0).band_columns();

        let deviation = 0.02 * (2.0_f64 / 3.0).sqrt();
        assert_relative_eq!(cols.middle[2].unwrap(), 1.12, epsilon = 1e-12);
        assert_relative_eq!(cols.upper[2].unwrap(), 1.12 + 2.0 * deviation, epsilon = 1e-12);
        assert_relative_eq!(cols.lower[2].unwrap(), 1.12 - 2.0 * deviation, epsilon = 1e-12);
    }

    #[test]
    fn flat_prices_collapse_the_bands() {
        let bars = hourly(&[1.2500; 6]);
        let cols = calculate_bollinger(&bars, 5, 2.0).band_columns();

        for i in 4..6 {
            assert_eq!(cols.upper[i], cols.middle[i]);
            assert_eq!(cols.lower[i], cols.middle[i]);
        }
        assert_eq!(cols.width()[5], Some(0.0));
    }

    #[test]
    fn width_is_proportional_to_multiplier() {
        let bars = hourly(&[1.10, 1.12, 1.14]);
        let unit = calculate_bollinger(&bars, 3, 1.0).band_columns().width()[2].unwrap();

        for mult in [0.5, 2.0, 2.5] {
            let width = calculate_bollinger(&bars, 3, mult).band_columns().width()[2].unwrap();
            assert_relative_eq!(width, unit * mult, max_relative = 1e-12);
        }
    }

    #[test]
    fn only_the_trailing_window_matters() {
        let calm = hourly(&[1.30, 1.10, 1.11, 1.12]);
        let spiky = hourly(&[0.90, 1.10, 1.11, 1.12]);

        let a = calculate_bollinger(&calm, 3, 2.0).band_columns();
        let b = calculate_bollinger(&spiky, 3, 2.0).band_columns();
        assert_eq!(a.upper[3], b.upper[3]);
        assert_eq!(a.lower[3], b.lower[3]);
        assert_ne!(a.middle[2], b.middle[2]);
    }

    #[test]
    fn degenerate_periods_are_all_undefined() {
        let bars = hourly(&[1.10, 1.11, 1.12]);
        for period in [0, 4] {
            let series = calculate_bollinger(&bars, period, 2.0);
            assert_eq!(series.values.len(), 3);
            assert!(series.values.iter().all(|p| !p.valid));
        }
    }

    #[test]
    fn series_records_its_parameters() {
        let series = calculate_bollinger(&hourly(&[1.10]), 20, 1.5);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult: 1.5
            }
        );
    }
}
