//! Single-position backtest engine.
//!
//! Walks a signalled frame bar by bar. Each bar first checks the open trade's
//! stop and target (stop first), then may open a new trade on a nonzero
//! signal, then records equity. A trade still open after the last bar is
//! closed at the final close; that PnL lands in `final_capital` and the
//! metrics, not in the equity curve.

use tracing::{debug, info};

use crate::domain::error::FxlabError;
use crate::domain::indicator_helpers::atr_or_default;
use crate::domain::metrics::Metrics;
use crate::domain::position::{Direction, ExitReason, Trade};
use crate::domain::signal::{SignalFrame, SIGNAL_COLUMN};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestConfig {
    /// Full bid/ask spread in price units; half is paid on each side.
    pub spread: f64,
    pub sl_atr_mult: f64,
    pub tp_atr_mult: f64,
    /// Fraction of current capital risked per trade.
    pub risk_pct: f64,
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            spread: 0.00015,
            sl_atr_mult: 1.5,
            tp_atr_mult: 2.0,
            risk_pct: 0.01,
            initial_capital: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// One value per bar, recorded before any end-of-data close.
    pub equity_curve: Vec<f64>,
    /// Capital after every trade, including one closed at end of data.
    pub final_capital: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub total_pnl: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl BacktestResult {
    fn new(trades: Vec<Trade>, equity_curve: Vec<f64>, final_capital: f64) -> Self {
        let metrics = Metrics::compute(&trades, &equity_curve);
        Self {
            trades,
            equity_curve,
            final_capital,
            win_rate: metrics.win_rate,
            total_trades: metrics.total_trades,
            total_pnl: metrics.total_pnl,
            sharpe_ratio: metrics.sharpe_ratio,
            max_drawdown: metrics.max_drawdown,
        }
    }

    pub fn final_equity(&self) -> f64 {
        self.final_capital
    }
}

/// PnL scaled so a stop-out loses `risk_pct` of `capital`. Zero when the
/// stop sits on the entry price.
pub fn sized_pnl(trade: &Trade, exit_price: f64, risk_pct: f64, capital: f64) -> f64 {
    let stop_distance = trade.stop_distance();
    if stop_distance > 0.0 {
        let position_size = risk_pct * capital / stop_distance;
        trade.price_pnl(exit_price) * position_size
    } else {
        0.0
    }
}

pub fn run_backtest(frame: &SignalFrame, config: &BacktestConfig) -> Result<BacktestResult, FxlabError> {
    if frame.is_empty() {
        return Err(FxlabError::EmptySeries);
    }
    let signals = frame.signals().ok_or_else(|| FxlabError::MissingColumn {
        column: SIGNAL_COLUMN.to_string(),
    })?;
    let atr = atr_or_default(frame);
    let bars = frame.bars();
    let half_spread = config.spread / 2.0;

    let mut capital = config.initial_capital;
    let mut equity_curve = Vec::with_capacity(bars.len());
    equity_curve.push(capital);
    let mut trades: Vec<Trade> = Vec::new();
    let mut open_trade: Option<Trade> = None;

    for i in 1..bars.len() {
        let bar = &bars[i];
        let atr_value = match atr[i] {
            Some(v) if v != 0.0 => v,
            _ => {
                equity_curve.push(capital);
                continue;
            }
        };

        if let Some(mut trade) = open_trade.take() {
            let exit = if trade.should_stop_loss(bar.high, bar.low) {
                Some((ExitReason::StopLoss, trade.stop_loss))
            } else if trade.should_take_profit(bar.high, bar.low) {
                Some((ExitReason::TakeProfit, trade.take_profit))
            } else {
                None
            };

            match exit {
                Some((reason, level)) => {
                    let exit_price = match trade.direction {
                        Direction::Long => level - half_spread,
                        Direction::Short => level + half_spread,
                    };
                    let pnl = sized_pnl(&trade, exit_price, config.risk_pct, capital);
                    trade.close(i, exit_price, pnl, reason);
                    capital += pnl;
                    debug!(bar = i, ?reason, exit_price, pnl, capital, "closed trade");
                    trades.push(trade);
                }
                None => open_trade = Some(trade),
            }
        }

        if open_trade.is_none() {
            if let Some(direction) = signals[i].direction() {
                let sl_dist = atr_value * config.sl_atr_mult;
                let tp_dist = atr_value * config.tp_atr_mult;
                let trade = match direction {
                    Direction::Long => {
                        let entry = bar.close + half_spread;
                        Trade::open(i, direction, entry, entry - sl_dist, entry + tp_dist)
                    }
                    Direction::Short => {
                        let entry = bar.close - half_spread;
                        Trade::open(i, direction, entry, entry + sl_dist, entry - tp_dist)
                    }
                };
                debug!(
                    bar = i,
                    %direction,
                    entry_price = trade.entry_price,
                    stop_loss = trade.stop_loss,
                    take_profit = trade.take_profit,
                    "opened trade"
                );
                open_trade = Some(trade);
            }
        }

        equity_curve.push(capital);
    }

    if let Some(mut trade) = open_trade.take() {
        let last = bars.len() - 1;
        let exit_price = bars[last].close;
        let pnl = sized_pnl(&trade, exit_price, config.risk_pct, capital);
        trade.close(last, exit_price, pnl, ExitReason::EndOfData);
        capital += pnl;
        debug!(bar = last, exit_price, pnl, capital, "closed trade at end of data");
        trades.push(trade);
    }

    let result = BacktestResult::new(trades, equity_curve, capital);
    info!(
        bars = bars.len(),
        trades = result.total_trades,
        total_pnl = result.total_pnl,
        win_rate = result.win_rate,
        "backtest complete"
    );
    Ok(result)
}
