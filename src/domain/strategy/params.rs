//! Strategy parameter schema and value coercion.
//!
//! Every strategy declares its parameters up front as a static schema. Raw
//! inputs (text from a config file or query string, or native numbers and
//! booleans) are coerced to the declared kind before anything is assigned.
//! Bounds are checked separately, when signals are generated.

use std::fmt;

use crate::domain::error::FxlabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Bool,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Int => write!(f, "integer"),
            ParamKind::Float => write!(f, "float"),
            ParamKind::Bool => write!(f, "boolean"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Bool(_) => ParamKind::Bool,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
            ParamValue::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// An untyped parameter value as supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamInput {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for ParamInput {
    fn from(value: &str) -> Self {
        ParamInput::Text(value.to_string())
    }
}

impl From<String> for ParamInput {
    fn from(value: String) -> Self {
        ParamInput::Text(value)
    }
}

impl From<i64> for ParamInput {
    fn from(value: i64) -> Self {
        ParamInput::Int(value)
    }
}

impl From<f64> for ParamInput {
    fn from(value: f64) -> Self {
        ParamInput::Float(value)
    }
}

impl From<bool> for ParamInput {
    fn from(value: bool) -> Self {
        ParamInput::Bool(value)
    }
}

impl fmt::Display for ParamInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamInput::Text(v) => write!(f, "{}", v),
            ParamInput::Int(v) => write!(f, "{}", v),
            ParamInput::Float(v) => write!(f, "{}", v),
            ParamInput::Bool(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ParamSpec {
    pub const fn int(name: &'static str, default: i64, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            default: ParamValue::Int(default),
            min,
            max,
        }
    }

    pub const fn float(name: &'static str, default: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default: ParamValue::Float(default),
            min,
            max,
        }
    }

    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: ParamValue::Bool(default),
            min: None,
            max: None,
        }
    }

    /// Converts a raw input to this parameter's declared kind.
    ///
    /// Integers truncate finite floats. Booleans accept "true", "1" and "yes"
    /// (any case) as true and every other string as false; numbers are true
    /// when nonzero.
    pub fn coerce(&self, input: &ParamInput) -> Result<ParamValue, FxlabError> {
        let fail = || FxlabError::ParamCoercion {
            key: self.name.to_string(),
            value: input.to_string(),
            expected: self.kind.to_string(),
        };

        match self.kind {
            ParamKind::Int => match input {
                ParamInput::Int(v) => Ok(ParamValue::Int(*v)),
                ParamInput::Float(v) if v.is_finite() => Ok(ParamValue::Int(v.trunc() as i64)),
                ParamInput::Float(_) => Err(fail()),
                ParamInput::Bool(v) => Ok(ParamValue::Int(i64::from(*v))),
                ParamInput::Text(s) => s.trim().parse::<i64>().map(ParamValue::Int).map_err(|_| fail()),
            },
            ParamKind::Float => match input {
                ParamInput::Int(v) => Ok(ParamValue::Float(*v as f64)),
                ParamInput::Float(v) => Ok(ParamValue::Float(*v)),
                ParamInput::Bool(v) => Ok(ParamValue::Float(if *v { 1.0 } else { 0.0 })),
                ParamInput::Text(s) => s.trim().parse::<f64>().map(ParamValue::Float).map_err(|_| fail()),
            },
            ParamKind::Bool => Ok(ParamValue::Bool(match input {
                ParamInput::Bool(v) => *v,
                ParamInput::Int(v) => *v != 0,
                ParamInput::Float(v) => *v != 0.0,
                ParamInput::Text(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
            })),
        }
    }

    pub fn check_bounds(&self, value: &ParamValue) -> Result<(), FxlabError> {
        let v = value.as_f64();
        if !v.is_finite() {
            return Err(FxlabError::ParamOutOfRange {
                key: self.name.to_string(),
                reason: format!("{} is not a finite number", value),
            });
        }
        if let Some(min) = self.min {
            if v < min {
                return Err(FxlabError::ParamOutOfRange {
                    key: self.name.to_string(),
                    reason: format!("{} is below the minimum of {}", value, min),
                });
            }
        }
        if let Some(max) = self.max {
            if v > max {
                return Err(FxlabError::ParamOutOfRange {
                    key: self.name.to_string(),
                    reason: format!("{} is above the maximum of {}", value, max),
                });
            }
        }
        Ok(())
    }
}
