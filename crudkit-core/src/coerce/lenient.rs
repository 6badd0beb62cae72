//! Type-blind scalar coercion for the read path.
//!
//! Read-path parameters have no column metadata, so this is a guess, not a
//! contract: booleans and boolean words become 0/1, numeric-looking strings
//! become numbers, everything else passes through unchanged. Nothing is
//! ever rejected here.

use serde_json::Value;

use crate::types::value::CoercedValue;

/// Best-effort coercion of one read-path parameter.
pub fn coerce_scalar(value: &Value) -> CoercedValue {
    match value {
        Value::Null => CoercedValue::Null,
        Value::Bool(b) => CoercedValue::Int(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CoercedValue::Int(i)
            } else {
                CoercedValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => return CoercedValue::Int(1),
                "false" | "0" => return CoercedValue::Int(0),
                _ => {}
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return CoercedValue::Int(i);
            }
            if let Ok(f) = trimmed.parse::<f64>() {
                return CoercedValue::Float(f);
            }
            CoercedValue::Text(s.clone())
        }
        other => CoercedValue::Json(other.clone()),
    }
}
