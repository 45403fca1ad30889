//! Closed set of known strategies and name-based lookup.

use tracing::debug;

use crate::domain::error::FxlabError;
use crate::domain::strategy::{MeanReversion, Strategy, VolatilityContraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MeanReversion,
    VolatilityContraction,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [
        StrategyKind::MeanReversion,
        StrategyKind::VolatilityContraction,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::VolatilityContraction => "volatility_contraction",
        }
    }

    /// Fresh instance with default parameters.
    pub fn create(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::MeanReversion => Box::new(MeanReversion::default()),
            StrategyKind::VolatilityContraction => Box::new(VolatilityContraction::default()),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let key = normalize_name(name);
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Lowercase, surrounding whitespace trimmed, inner spaces to underscores.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

pub fn get_strategy(name: &str) -> Result<Box<dyn Strategy>, FxlabError> {
    match StrategyKind::from_name(name) {
        Some(kind) => {
            debug!(strategy = kind.key(), "resolved strategy");
            Ok(kind.create())
        }
        None => Err(FxlabError::UnknownStrategy {
            name: name.to_string(),
        }),
    }
}

pub fn all_strategies() -> Vec<&'static str> {
    StrategyKind::ALL.iter().map(|kind| kind.key()).collect()
}
