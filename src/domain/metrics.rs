//! Performance metrics over a closed trade ledger and its equity curve.

use super::position::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    pub total_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl Metrics {
    /// All-zero metrics when there are no trades.
    pub fn compute(trades: &[Trade], equity_curve: &[f64]) -> Self {
        if trades.is_empty() {
            return Metrics::default();
        }

        let total_trades = trades.len();
        let wins = trades.iter().filter(|t| t.pnl > 0.0).count();

        Metrics {
            total_trades,
            win_rate: wins as f64 / total_trades as f64,
            total_pnl: trades.iter().map(|t| t.pnl).sum(),
            sharpe_ratio: compute_sharpe(equity_curve),
            max_drawdown: compute_drawdown(equity_curve),
        }
    }
}

/// Largest relative decline from the running peak. Samples taken while the
/// peak is not positive count as no drawdown.
pub fn compute_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        let dd = if peak > 0.0 { (peak - equity) / peak } else { 0.0 };
        if dd > max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Annualised mean/stddev of bar-over-bar equity returns (population stddev).
/// Zero with fewer than two returns, zero variance, or a non-finite result.
pub fn compute_sharpe(equity_curve: &[f64]) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0];
            let curr = w[1];
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        let sharpe = mean / stddev * TRADING_DAYS_PER_YEAR.sqrt();
        if sharpe.is_finite() { sharpe } else { 0.0 }
    } else {
        0.0
    }
}
