//! Types module: defines the scalar values carried by filter predicates.
//!
//! Values are opaque to the compiler: they are moved into the parameter list untouched and
//! the database decides whether they fit the target column.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl LiteralValue {
    /// Short name of the value's kind, logged alongside compiled predicates.
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Int(_) => "int",
            LiteralValue::Float(_) => "float",
            LiteralValue::String(_) => "string",
        }
    }
}

/// Integers must fit in `i64`; wider ones are rejected rather than rounded to `f64`.
impl<'de> Deserialize<'de> for LiteralValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LiteralVisitor;

        impl<'de> Visitor<'de> for LiteralVisitor {
            type Value = LiteralValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a bool, number or string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<LiteralValue, E> {
                Ok(LiteralValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<LiteralValue, E> {
                Ok(LiteralValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<LiteralValue, E> {
                i64::try_from(v)
                    .map(LiteralValue::Int)
                    .map_err(|_| E::custom(format!("integer {v} does not fit in i64")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<LiteralValue, E> {
                Ok(LiteralValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LiteralValue, E> {
                Ok(LiteralValue::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<LiteralValue, E> {
                Ok(LiteralValue::String(v))
            }
        }

        deserializer.deserialize_any(LiteralVisitor)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Int(i) => write!(f, "{i}"),
            LiteralValue::Float(x) => write!(f, "{x}"),
            LiteralValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::String(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        LiteralValue::Int(value.into())
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}
