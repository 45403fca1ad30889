//! Domain error types.

/// Top-level error type for fxlab.
#[derive(Debug, thiserror::Error)]
pub enum FxlabError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("price series is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("strategy not found: {name}")]
    UnknownStrategy { name: String },

    #[error("cannot convert '{value}' to {expected} for parameter '{key}'")]
    ParamCoercion {
        key: String,
        value: String,
        expected: String,
    },

    #[error("parameter '{key}' out of range: {reason}")]
    ParamOutOfRange { key: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FxlabError> for std::process::ExitCode {
    fn from(err: &FxlabError) -> Self {
        let code: u8 = match err {
            FxlabError::Io(_) => 1,
            FxlabError::ConfigParse { .. }
            | FxlabError::ConfigMissing { .. }
            | FxlabError::ConfigInvalid { .. } => 2,
            FxlabError::Data { .. } => 3,
            FxlabError::UnknownStrategy { .. }
            | FxlabError::ParamCoercion { .. }
            | FxlabError::ParamOutOfRange { .. } => 4,
            FxlabError::EmptySeries
            | FxlabError::MissingColumn { .. }
            | FxlabError::LengthMismatch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
