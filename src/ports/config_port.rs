//! Typed access to sectioned configuration.

use crate::domain::error::FxlabError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `default` when the key is absent; `ConfigInvalid` when the value is
    /// not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, FxlabError>;

    /// Every key present in `section` that has a value, sorted. Empty if the
    /// section does not exist.
    fn section_keys(&self, section: &str) -> Vec<String>;
}
