//! Configuration validation.
//!
//! Checks `[backtest]` and `[strategy]` before anything is loaded or run.

use crate::domain::error::FxlabError;
use crate::domain::strategy::get_strategy;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), FxlabError> {
    validate_initial_capital(config)?;
    validate_spread(config)?;
    validate_atr_multipliers(config)?;
    validate_risk_pct(config)?;
    validate_instrument(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), FxlabError> {
    match config.get_string("strategy", "name") {
        Some(name) if !name.trim().is_empty() => {
            get_strategy(&name)?;
            Ok(())
        }
        _ => Err(FxlabError::ConfigMissing {
            section: "strategy".to_string(),
            key: "name".to_string(),
        }),
    }
}

fn invalid(key: &str, reason: &str) -> FxlabError {
    FxlabError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), FxlabError> {
    let value = config.get_double("backtest", "initial_capital", 10_000.0)?;
    if !(value > 0.0) {
        return Err(invalid("initial_capital", "initial_capital must be positive"));
    }
    Ok(())
}

fn validate_spread(config: &dyn ConfigPort) -> Result<(), FxlabError> {
    let value = config.get_double("backtest", "spread_pips", 0.0)?;
    if !(value >= 0.0) {
        return Err(invalid("spread_pips", "spread_pips must be non-negative"));
    }
    Ok(())
}

fn validate_atr_multipliers(config: &dyn ConfigPort) -> Result<(), FxlabError> {
    for key in ["sl_atr_mult", "tp_atr_mult"] {
        let value = config.get_double("backtest", key, 0.0)?;
        if !(value >= 0.0) {
            return Err(invalid(key, &format!("{key} must be non-negative")));
        }
    }
    Ok(())
}

fn validate_risk_pct(config: &dyn ConfigPort) -> Result<(), FxlabError> {
    let value = config.get_double("backtest", "risk_pct", 0.01)?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid("risk_pct", "risk_pct must be in (0, 1]"));
    }
    Ok(())
}

fn validate_instrument(config: &dyn ConfigPort) -> Result<(), FxlabError> {
    match config.get_string("backtest", "instrument") {
        Some(s) if s.trim().is_empty() => Err(invalid("instrument", "instrument must not be blank")),
        _ => Ok(()),
    }
}
