//! Shared helpers that compute indicators and attach them to a frame.

use crate::domain::error::FxlabError;
use crate::domain::indicator::{calculate_atr, calculate_bollinger, BandColumns};
use crate::domain::signal::{Column, SignalFrame, ATR_COLUMN};

pub const BB_UPPER: &str = "bb_upper";
pub const BB_MIDDLE: &str = "bb_middle";
pub const BB_LOWER: &str = "bb_lower";

/// Period used when a frame reaches the engine without an `atr` column.
pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Computes Bollinger Bands on close and stores them as `bb_upper`,
/// `bb_middle` and `bb_lower`.
pub fn add_bollinger(
    frame: &mut SignalFrame,
    period: usize,
    stddev_mult: f64,
) -> Result<BandColumns, FxlabError> {
    let bands = calculate_bollinger(frame.bars(), period, stddev_mult).band_columns();
    frame.insert_column(BB_UPPER, bands.upper.clone())?;
    frame.insert_column(BB_MIDDLE, bands.middle.clone())?;
    frame.insert_column(BB_LOWER, bands.lower.clone())?;
    Ok(bands)
}

pub fn add_atr(frame: &mut SignalFrame, period: usize) -> Result<Column, FxlabError> {
    let atr = calculate_atr(frame.bars(), period).simple_values();
    frame.insert_column(ATR_COLUMN, atr.clone())?;
    Ok(atr)
}

/// The frame's own `atr` column if present, otherwise ATR(14) computed on the fly.
pub fn atr_or_default(frame: &SignalFrame) -> Column {
    match frame.column(ATR_COLUMN) {
        Some(atr) => atr.to_vec(),
        None => calculate_atr(frame.bars(), DEFAULT_ATR_PERIOD).simple_values(),
    }
}
