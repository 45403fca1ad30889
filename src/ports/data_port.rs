//! Candle source port.

use crate::domain::error::FxlabError;
use crate::domain::instrument::Granularity;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Bars for `instrument` at `granularity`, sorted by timestamp.
    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
    ) -> Result<Vec<OhlcvBar>, FxlabError>;

    /// Instruments with data available at `granularity`.
    fn list_instruments(&self, granularity: Granularity) -> Result<Vec<String>, FxlabError>;
}
