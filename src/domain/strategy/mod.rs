//! Signal-generating strategies.
//!
//! A strategy turns a [`SignalFrame`] into a new frame carrying a `signal`
//! column plus whatever indicator columns it computed on the way. It never
//! mutates the frame it was given, so the same input can be fed to several
//! strategies (or the same one twice) with identical results.

pub mod mean_reversion;
pub mod params;
pub mod registry;
pub mod volatility_contraction;

pub use mean_reversion::MeanReversion;
pub use params::{ParamInput, ParamKind, ParamSpec, ParamValue};
pub use registry::{all_strategies, get_strategy, normalize_name, StrategyKind};
pub use volatility_contraction::VolatilityContraction;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::domain::error::FxlabError;
use crate::domain::signal::SignalFrame;

/// Current parameter values in declaration order.
pub type Parameters = Vec<(&'static str, ParamValue)>;

/// Overlay group name to the frame columns drawn in that group.
pub type OverlayColumns = BTreeMap<&'static str, Vec<&'static str>>;

pub trait Strategy: Send + Sync + fmt::Debug {
    /// Human-readable name (e.g. "Mean Reversion").
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn schema(&self) -> &'static [ParamSpec];

    fn parameters(&self) -> Parameters;

    /// Stores a value already coerced to the parameter's declared kind.
    fn assign(&mut self, name: &str, value: ParamValue);

    /// Returns a copy of `frame` with a signal column and this strategy's
    /// indicator columns. Fails if a parameter is out of range.
    fn generate_signals(&self, frame: &SignalFrame) -> Result<SignalFrame, FxlabError>;

    fn overlay_columns(&self) -> OverlayColumns {
        OverlayColumns::new()
    }

    /// Registry key: lowercase with spaces replaced by underscores.
    fn key(&self) -> String {
        normalize_name(self.name())
    }

    /// Merges `params` into the current values.
    ///
    /// Keys not in the schema are ignored. Every known key is coerced before
    /// any value is assigned, so a coercion failure leaves the strategy as it was.
    fn set_parameters(&mut self, params: &HashMap<String, ParamInput>) -> Result<(), FxlabError> {
        let schema = self.schema();
        let mut coerced = Vec::with_capacity(params.len());

        for (key, input) in params {
            match schema.iter().find(|spec| spec.name == key.as_str()) {
                Some(spec) => coerced.push((spec.name, spec.coerce(input)?)),
                None => tracing::debug!(strategy = self.name(), key = %key, "ignoring unknown parameter"),
            }
        }

        for (name, value) in coerced {
            self.assign(name, value);
        }
        Ok(())
    }

    fn validate_parameters(&self) -> Result<(), FxlabError> {
        let schema = self.schema();
        for (name, value) in self.parameters() {
            if let Some(spec) = schema.iter().find(|spec| spec.name == name) {
                spec.check_bounds(&value)?;
            }
        }
        Ok(())
    }
}

/// Window length from a bounds-checked integer parameter.
pub(crate) fn window(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
