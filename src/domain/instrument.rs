//! Instrument conventions: pip size, default spreads and candle granularities.
//!
//! The engine takes its spread in price units. Converting a quoted spread in
//! pips happens here, before a backtest is configured.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::FxlabError;

pub const DEFAULT_INSTRUMENT: &str = "EUR_USD";
pub const DEFAULT_SPREAD_PIPS: f64 = 1.5;

const SPREAD_TABLE: &[(&str, f64)] = &[("EUR_USD", 1.5), ("GBP_USD", 2.0), ("USD_JPY", 1.5)];

/// 0.01 for JPY-quoted pairs, 0.0001 otherwise.
pub fn pip_size(instrument: &str) -> f64 {
    let quote = instrument.rsplit(['_', '/']).next().unwrap_or(instrument);
    if quote.eq_ignore_ascii_case("JPY") {
        0.01
    } else {
        0.0001
    }
}

pub fn default_spread_pips(instrument: &str) -> f64 {
    SPREAD_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(instrument))
        .map(|(_, pips)| *pips)
        .unwrap_or(DEFAULT_SPREAD_PIPS)
}

pub fn spread_in_price(instrument: &str, spread_pips: f64) -> f64 {
    spread_pips * pip_size(instrument)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    M15,
    M30,
    H1,
    H2,
    H4,
    D1,
    W1,
}

impl Granularity {
    pub const ALL: [Granularity; 7] = [
        Granularity::M15,
        Granularity::M30,
        Granularity::H1,
        Granularity::H2,
        Granularity::H4,
        Granularity::D1,
        Granularity::W1,
    ];

    /// Interval label as shown to users, e.g. "1H".
    pub fn label(self) -> &'static str {
        match self {
            Granularity::M15 => "15M",
            Granularity::M30 => "30M",
            Granularity::H1 => "1H",
            Granularity::H2 => "2H",
            Granularity::H4 => "4H",
            Granularity::D1 => "1D",
            Granularity::W1 => "1W",
        }
    }

    /// Broker candle code, e.g. "H1".
    pub fn code(self) -> &'static str {
        match self {
            Granularity::M15 => "M15",
            Granularity::M30 => "M30",
            Granularity::H1 => "H1",
            Granularity::H2 => "H2",
            Granularity::H4 => "H4",
            Granularity::D1 => "D",
            Granularity::W1 => "W",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Granularity {
    type Err = FxlabError;

    /// Accepts either the label ("1H") or the candle code ("H1").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|g| g.label() == s || g.code() == s)
            .ok_or_else(|| FxlabError::Data {
                reason: format!("unknown granularity '{}'", s),
            })
    }
}
