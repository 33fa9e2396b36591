//! Register typing for raw device values
//!
//! Every register name carries a declared type marker (`__R2376_REAL_.1f`,
//! `__R2373.1_BOOL_i`, ...). The marker drives how the raw attribute text is
//! coerced; names with no recognized marker pass through as text.

use crate::error::{KotelError, Result};
use std::collections::HashMap;

/// A register value coerced to its declared type
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterValue {
    /// BOOL and *INT registers (booleans land as 0/1)
    Integer(i64),
    /// REAL registers
    Float(f64),
    /// Registers without a recognized type marker
    Text(String),
}

impl RegisterValue {
    /// Integer content, if this value is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RegisterValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Float content, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RegisterValue::Integer(v) => Some(*v as f64),
            RegisterValue::Float(v) => Some(*v),
            RegisterValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterValue::Integer(v) => write!(f, "{v}"),
            RegisterValue::Float(v) => write!(f, "{v}"),
            RegisterValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Coercion override for a register whose declared type is misleading
pub type TypeOverride = fn(&str) -> Result<RegisterValue>;

/// Overrides keyed by exact register name
pub type TypeOverrides = HashMap<String, TypeOverride>;

/// Overrides used in production
///
/// `__R23658_UDINT_u` is the compressor running-time counter; declared as an
/// unsigned integer but stored as float.
pub fn default_overrides() -> TypeOverrides {
    let mut overrides = TypeOverrides::new();
    overrides.insert("__R23658_UDINT_u".to_string(), parse_float as TypeOverride);
    overrides
}

/// Coerce a raw register value according to its name
///
/// Overrides take precedence over marker inference. Marker priority is
/// BOOL, then REAL, then INT; a name with none of them returns the raw
/// text unchanged, so the function is total over register names.
/// Malformed numeric text is a parse error naming the register.
pub fn retype(name: &str, raw: &str, overrides: &TypeOverrides) -> Result<RegisterValue> {
    if let Some(override_fn) = overrides.get(name) {
        return override_fn(raw);
    }

    if name.contains("BOOL") {
        parse_integer(name, raw)
    } else if name.contains("REAL") {
        parse_float(raw).map_err(|_| malformed(name, raw))
    } else if name.contains("INT") {
        parse_integer(name, raw)
    } else {
        Ok(RegisterValue::Text(raw.to_string()))
    }
}

fn parse_integer(name: &str, raw: &str) -> Result<RegisterValue> {
    raw.trim()
        .parse::<i64>()
        .map(RegisterValue::Integer)
        .map_err(|_| malformed(name, raw))
}

fn parse_float(raw: &str) -> Result<RegisterValue> {
    raw.trim()
        .parse::<f64>()
        .map(RegisterValue::Float)
        .map_err(|_| KotelError::parse(format!("Malformed float value {raw:?}")))
}

fn malformed(name: &str, raw: &str) -> KotelError {
    KotelError::parse(format!("Register {name}: malformed numeric value {raw:?}"))
}
