//! Rolling percentile rank.
//!
//! For each bar, the rank (0–100) of the current value inside the trailing
//! window of `lookback` values, current bar included. Ties share the average
//! rank: rank = below + (equal + 1) / 2, where `equal` counts the current
//! value itself.
//!
//! A point is undefined until `lookback` values exist, and whenever any value
//! in its window is undefined. A zero lookback is never defined.

pub fn calculate_percent_rank(values: &[Option<f64>], lookback: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if lookback == 0 || i + 1 < lookback {
                return None;
            }
            let current = values[i]?;
            let window = &values[i + 1 - lookback..=i];

            let mut below = 0usize;
            let mut equal = 0usize;
            for v in window {
                let v = (*v)?;
                if v < current {
                    below += 1;
                } else if v == current {
                    equal += 1;
                }
            }

            let rank = below as f64 + (equal as f64 + 1.0) / 2.0;
            Some(rank / lookback as f64 * 100.0)
        })
        .collect()
}
