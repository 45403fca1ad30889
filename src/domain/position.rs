//! Trade tracking for the single-position engine.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfData,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::EndOfData => write!(f, "end_of_data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    pub entry_index: usize,
    pub entry_price: f64,
    pub direction: Direction,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub exit_index: Option<usize>,
    pub exit_price: Option<f64>,
    pub exit_reason: Option<ExitReason>,
    pub pnl: f64,
    pub closed: bool,
}

impl Trade {
    pub fn open(
        entry_index: usize,
        direction: Direction,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
    ) -> Self {
        Self {
            entry_index,
            entry_price,
            direction,
            stop_loss,
            take_profit,
            exit_index: None,
            exit_price: None,
            exit_reason: None,
            pnl: 0.0,
            closed: false,
        }
    }

    /// Longs stop out when the low touches the stop, shorts when the high does.
    pub fn should_stop_loss(&self, high: f64, low: f64) -> bool {
        match self.direction {
            Direction::Long => low <= self.stop_loss,
            Direction::Short => high >= self.stop_loss,
        }
    }

    pub fn should_take_profit(&self, high: f64, low: f64) -> bool {
        match self.direction {
            Direction::Long => high >= self.take_profit,
            Direction::Short => low <= self.take_profit,
        }
    }

    pub fn stop_distance(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    /// Price move in the trade's favour, per unit.
    pub fn price_pnl(&self, exit_price: f64) -> f64 {
        (exit_price - self.entry_price) * self.direction.sign()
    }

    pub fn close(&mut self, exit_index: usize, exit_price: f64, pnl: f64, reason: ExitReason) {
        self.exit_index = Some(exit_index);
        self.exit_price = Some(exit_price);
        self.exit_reason = Some(reason);
        self.pnl = pnl;
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_long() -> Trade {
        Trade::open(3, Direction::Long, 1.1000, 1.0950, 1.1100)
    }

    fn sample_short() -> Trade {
        Trade::open(3, Direction::Short, 1.1000, 1.1050, 1.0900)
    }

    #[test]
    fn open_trade_is_not_closed() {
        let trade = sample_long();
        assert!(!trade.closed);
        assert!(trade.exit_index.is_none());
        assert!(trade.exit_price.is_none());
        assert_eq!(trade.direction, Direction::Long);
    }

    #[test]
    fn stop_loss_long_triggered_by_low() {
        let trade = sample_long();
        assert!(trade.should_stop_loss(1.1010, 1.0940));
        assert!(trade.should_stop_loss(1.1010, 1.0950));
        assert!(!trade.should_stop_loss(1.1010, 1.0960));
    }

    #[test]
    fn stop_loss_short_triggered_by_high() {
        let trade = sample_short();
        assert!(trade.should_stop_loss(1.1060, 1.0990));
        assert!(trade.should_stop_loss(1.1050, 1.0990));
        assert!(!trade.should_stop_loss(1.1040, 1.0990));
    }

    #[test]
    fn take_profit_long_triggered_by_high() {
        let trade = sample_long();
        assert!(trade.should_take_profit(1.1100, 1.1000));
        assert!(!trade.should_take_profit(1.1090, 1.1000));
    }

    #[test]
    fn take_profit_short_triggered_by_low() {
        let trade = sample_short();
        assert!(trade.should_take_profit(1.1000, 1.0900));
        assert!(!trade.should_take_profit(1.1000, 1.0910));
    }

    #[test]
    fn price_pnl_respects_direction() {
        assert!((sample_long().price_pnl(1.1050) - 0.0050).abs() < 1e-12);
        assert!((sample_short().price_pnl(1.1050) + 0.0050).abs() < 1e-12);
    }

    #[test]
    fn stop_distance_is_absolute() {
        assert!((sample_long().stop_distance() - 0.0050).abs() < 1e-12);
        assert!((sample_short().stop_distance() - 0.0050).abs() < 1e-12);
    }

    #[test]
    fn close_records_exit() {
        let mut trade = sample_long();
        trade.close(7, 1.1100, 200.0, ExitReason::TakeProfit);
        assert!(trade.closed);
        assert_eq!(trade.exit_index, Some(7));
        assert_eq!(trade.exit_price, Some(1.1100));
        assert_eq!(trade.exit_reason, Some(ExitReason::TakeProfit));
        assert!((trade.pnl - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Long.to_string(), "LONG");
        assert_eq!(Direction::Short.to_string(), "SHORT");
    }
}
