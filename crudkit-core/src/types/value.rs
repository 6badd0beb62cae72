//! The canonical post-validation value representation and row aliases.

use serde::{Deserialize, Serialize};

/// A result row: column name to loosely-typed value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A result set as returned by the driver.
pub type RowSet = Vec<Row>;

/// A loosely-typed parameter map supplied by the caller.
pub type ParamMap = serde_json::Map<String, serde_json::Value>;

/// The canonical in-memory representation bound to a statement after
/// coercion and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoercedValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
}

impl CoercedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The value as an integer, when it carries one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// The value as text, when it carries a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Map a raw JSON value to its nearest canonical representation without
    /// consulting a column type. Used as the fallback when no per-type rule
    /// matched; strict validation decides afterwards whether the result is
    /// acceptable.
    pub fn from_raw(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Json(other.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_raw_maps_scalars() {
        assert_eq!(CoercedValue::from_raw(&json!(null)), CoercedValue::Null);
        assert_eq!(CoercedValue::from_raw(&json!(7)), CoercedValue::Int(7));
        assert_eq!(CoercedValue::from_raw(&json!(1.5)), CoercedValue::Float(1.5));
        assert_eq!(CoercedValue::from_raw(&json!(true)), CoercedValue::Bool(true));
        assert_eq!(
            CoercedValue::from_raw(&json!("x")),
            CoercedValue::Text("x".to_string())
        );
        assert_eq!(
            CoercedValue::from_raw(&json!([1, 2])),
            CoercedValue::Json(json!([1, 2]))
        );
    }
}
