//! Scalar cell values
//!
//! Store properties arrive as strings or loosely typed values. Every cell of
//! an overview table is a [`Scalar`], and raw strings are coerced with
//! [`parse_scalar`].

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Property name to value mapping for one run/benchmark pair.
pub type PropertyMap = BTreeMap<String, Scalar>;

/// A single typed cell value.
///
/// Equality, ordering and hashing follow [`Scalar::total_cmp`], so scalars
/// (including floats) can be used as group keys. Values of different
/// variants never compare equal.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// Missing value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Signed integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Start time derived from an epoch run id
    Timestamp(DateTime<Utc>),
    /// Literal string value
    String(String),
}

impl Scalar {
    /// Check whether the value is missing.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value. Booleans count as 0/1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Boolean(v) => Some(f64::from(u8::from(*v))),
            _ => None,
        }
    }

    /// Get the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in log and error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Timestamp(_) => "timestamp",
            Self::String(_) => "string",
        }
    }

    /// Re-serialize the value as JSON.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null => Value::Null,
            Self::Boolean(v) => Value::Bool(*v),
            Self::Integer(v) => Value::from(*v),
            Self::Float(v) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
            Self::Timestamp(v) => Value::String(v.to_rfc3339()),
            Self::String(v) => Value::String(v.clone()),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean(_) => 1,
            Self::Integer(_) | Self::Float(_) => 2,
            Self::Timestamp(_) => 3,
            Self::String(_) => 4,
        }
    }

    /// Total order over all scalars.
    ///
    /// `Null < Boolean < numbers < Timestamp < String`. Integers and floats
    /// compare numerically; an integer sorts before a float of equal value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Self::Float(a), Self::Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(v) => v.hash(state),
            Self::Integer(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Timestamp(v) => v.hash(state),
            Self::String(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Try to read `raw` as a structured literal.
///
/// The input is lowercased and parsed as JSON, so `"True"`, `"123"`,
/// `"1.5"` and `"null"` become typed values. Returns `None` for anything that
/// is not a JSON scalar, including arrays and objects.
#[must_use]
pub fn try_parse_literal(raw: &str) -> Option<Scalar> {
    use serde_json::Value;

    match serde_json::from_str::<Value>(&raw.to_lowercase()).ok()? {
        Value::Null => Some(Scalar::Null),
        Value::Bool(v) => Some(Scalar::Boolean(v)),
        Value::Number(n) => n
            .as_i64()
            .map(Scalar::Integer)
            .or_else(|| n.as_f64().map(Scalar::Float)),
        Value::String(s) => Some(Scalar::String(s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Best-effort coercion of a raw property string. Never fails: anything that
/// is not a structured literal is kept verbatim as a string.
#[must_use]
pub fn parse_scalar(raw: &str) -> Scalar {
    try_parse_literal(raw).unwrap_or_else(|| Scalar::String(raw.to_string()))
}
