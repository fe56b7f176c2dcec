use std::fmt;

use derive_more::From;
use serde::{
    Serialize,
    de::{self, Deserialize, Deserializer},
};

/// A leaf value of a response or of an input literal.
///
/// `Long` carries integers that do not fit into the 32 bits GraphQL's `Int`
/// mandates.
#[derive(Clone, Debug, From, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer out of `Int`'s range.
    Long(i64),
    /// Double-precision float.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Boolean.
    Boolean(bool),
}

impl ScalarValue {
    /// Returns the value as an `i32`, if it is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Long(l) => i32::try_from(*l).ok(),
            _ => None,
        }
    }

    /// Returns the value as an `i64`, widening an `Int`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some((*i).into()),
            Self::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Returns the value as an `f64`, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some((*i).into()),
            Self::Long(l) => Some(*l as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a `&str`, if it is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a `bool`, if it is a `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the raw kind this value carries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "Int",
            Self::Long(_) => "Long",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Boolean(_) => "Boolean",
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarValueVisitor;

        impl de::Visitor<'_> for ScalarValueVisitor {
            type Value = ScalarValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a valid scalar value")
            }

            fn visit_bool<E>(self, b: bool) -> Result<Self::Value, E> {
                Ok(ScalarValue::Boolean(b))
            }

            fn visit_i64<E>(self, n: i64) -> Result<Self::Value, E> {
                Ok(i32::try_from(n).map_or(ScalarValue::Long(n), ScalarValue::Int))
            }

            fn visit_u64<E: de::Error>(self, n: u64) -> Result<Self::Value, E> {
                match i64::try_from(n) {
                    Ok(n) => self.visit_i64(n),
                    Err(_) => Err(E::custom(format!("integer {n} out of range"))),
                }
            }

            fn visit_f64<E>(self, n: f64) -> Result<Self::Value, E> {
                Ok(ScalarValue::Float(n))
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
                self.visit_string(s.into())
            }

            fn visit_string<E>(self, s: String) -> Result<Self::Value, E> {
                Ok(ScalarValue::String(s))
            }
        }

        deserializer.deserialize_any(ScalarValueVisitor)
    }
}
