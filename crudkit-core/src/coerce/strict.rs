//! Strict per-column coercion for write paths.
//!
//! Two passes, deliberately kept separate:
//!
//! 1. `normalize` — best-effort conversion toward the column's declared
//!    type. Never fails; input that matches no rule passes through as its
//!    raw representation.
//! 2. `validate` — hard acceptance check on the normalized value. Format
//!    and range are re-checked exactly (canonical date round-trip, year
//!    window, numeric-ness) and violations fail naming the column.
//!
//! A malformed date string is therefore *attempted* (both accepted
//! patterns) before it is rejected.

use serde_json::Value;

use crate::errors::QueryError;
use crate::types::column::ColumnMetadata;
use crate::types::sql_type::SqlType;
use crate::types::value::CoercedValue;

use super::datetime;

/// Coerce `value` for `column`, or fail with a validation error naming it.
pub fn coerce_for_column(
    value: &Value,
    column: &ColumnMetadata,
) -> Result<CoercedValue, QueryError> {
    let normalized = normalize(value, column.declared_type, column.nullable);
    validate(&normalized, column.declared_type, &column.name)?;
    Ok(normalized)
}

/// Pass 1: best-effort normalization. Unmatched input falls through as its
/// raw representation for `validate` to judge.
fn normalize(value: &Value, ty: SqlType, nullable: bool) -> CoercedValue {
    if value.is_null() {
        return CoercedValue::Null;
    }
    if nullable && value.as_str() == Some("") {
        return CoercedValue::Null;
    }

    match ty {
        SqlType::Bit | SqlType::Boolean => normalize_truthy(value)
            .map(|n| CoercedValue::Bool(n != 0))
            .unwrap_or_else(|| CoercedValue::from_raw(value)),

        SqlType::TinyInt => normalize_truthy(value)
            .map(CoercedValue::Int)
            .unwrap_or_else(|| CoercedValue::from_raw(value)),

        SqlType::SmallInt | SqlType::MediumInt | SqlType::Int | SqlType::BigInt => {
            match numeric_of(value) {
                Some(f) => CoercedValue::Int(f as i64),
                None => CoercedValue::from_raw(value),
            }
        }

        SqlType::Decimal | SqlType::Float | SqlType::Double => match numeric_of(value) {
            Some(f) => CoercedValue::Float(f),
            None => CoercedValue::from_raw(value),
        },

        SqlType::Date => match value.as_str().and_then(datetime::normalize_date) {
            Some(s) => CoercedValue::Text(s),
            None => CoercedValue::from_raw(value),
        },

        SqlType::DateTime | SqlType::Timestamp => {
            match value.as_str().and_then(datetime::normalize_datetime) {
                Some(s) => CoercedValue::Text(s),
                None => CoercedValue::from_raw(value),
            }
        }

        SqlType::Time => match value.as_str().and_then(datetime::normalize_time) {
            Some(s) => CoercedValue::Text(s),
            None => CoercedValue::from_raw(value),
        },

        SqlType::Year => match numeric_of(value) {
            Some(f) => CoercedValue::Int(f as i64),
            None => CoercedValue::from_raw(value),
        },

        ty if ty.is_text() => match value {
            Value::String(s) => CoercedValue::Text(s.trim().to_string()),
            Value::Number(n) => CoercedValue::Text(n.to_string()),
            Value::Bool(b) => CoercedValue::Text(if *b { "1" } else { "0" }.to_string()),
            other => CoercedValue::from_raw(other),
        },

        ty if ty.is_blob() => CoercedValue::from_raw(value),

        SqlType::Json => match value {
            // A string must already be JSON-encoded; structured values are
            // serialized. validate re-checks the string case.
            Value::String(_) => CoercedValue::from_raw(value),
            Value::Array(_) | Value::Object(_) => CoercedValue::Json(value.clone()),
            other => CoercedValue::from_raw(other),
        },

        _ => CoercedValue::from_raw(value),
    }
}

/// Boolean-ish normalization shared by `Bit`, `Boolean`, and `TinyInt`:
/// booleans map to 0/1, numerics truncate, and the word sets
/// {"true","1","yes"} / {"false","0","no"} match case-insensitively.
fn normalize_truthy(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => Some(n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64)),
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            if let Ok(f) = lowered.parse::<f64>() {
                return Some(f as i64);
            }
            match lowered.as_str() {
                "true" | "yes" => Some(1),
                "false" | "no" => Some(0),
                _ => None,
            }
        }
        _ => None,
    }
}

/// A numeric reading of `value`: JSON numbers directly, numeric-looking
/// strings after trimming. Booleans do not count.
fn numeric_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Pass 2: hard validation of the normalized value against the declared
/// type. `Null` always passes — required-ness is checked separately against
/// the column metadata, not here.
fn validate(value: &CoercedValue, ty: SqlType, column: &str) -> Result<(), QueryError> {
    if value.is_null() {
        return Ok(());
    }

    let fail = |reason: &str| {
        Err(QueryError::TypeValidation {
            column: column.to_string(),
            reason: reason.to_string(),
        })
    };

    match ty {
        SqlType::Bit | SqlType::Boolean => match value {
            CoercedValue::Bool(_) | CoercedValue::Int(_) => Ok(()),
            _ => fail("must be a boolean value"),
        },

        ty if ty.is_integer() => match value {
            CoercedValue::Int(_) => Ok(()),
            _ => fail("must be an integer"),
        },

        ty if ty.is_floating() => match value {
            CoercedValue::Float(_) | CoercedValue::Int(_) => Ok(()),
            _ => fail("must be a decimal number"),
        },

        SqlType::Date => match value {
            CoercedValue::Text(s) if datetime::is_canonical_date(s) => Ok(()),
            _ => fail("must be a valid date in YYYY-MM-DD format"),
        },

        SqlType::DateTime | SqlType::Timestamp => match value {
            CoercedValue::Text(s) if datetime::is_canonical_datetime(s) => Ok(()),
            _ => fail("must be a valid datetime in YYYY-MM-DD HH:MM:SS format"),
        },

        SqlType::Time => match value {
            CoercedValue::Text(s) if datetime::is_canonical_time(s) => Ok(()),
            _ => fail("must be a valid time in HH:MM:SS format"),
        },

        SqlType::Year => match value {
            CoercedValue::Int(y) if (1901..=2155).contains(y) => Ok(()),
            _ => fail("must be a year between 1901 and 2155"),
        },

        ty if ty.is_text() => match value {
            CoercedValue::Text(_) => Ok(()),
            _ => fail("must be a string value"),
        },

        ty if ty.is_blob() => Ok(()),

        SqlType::Json => match value {
            CoercedValue::Json(_) => Ok(()),
            CoercedValue::Text(s) if serde_json::from_str::<Value>(s).is_ok() => Ok(()),
            _ => fail("must be valid JSON"),
        },

        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(ty: SqlType, nullable: bool) -> ColumnMetadata {
        ColumnMetadata {
            name: "field".to_string(),
            declared_type: ty,
            nullable,
            has_default: false,
        }
    }

    fn coerce(value: serde_json::Value, ty: SqlType) -> Result<CoercedValue, QueryError> {
        coerce_for_column(&value, &column(ty, true))
    }

    #[test]
    fn empty_string_becomes_null_when_nullable() {
        assert_eq!(coerce(json!(""), SqlType::Int).unwrap(), CoercedValue::Null);
        assert_eq!(coerce(json!(null), SqlType::Date).unwrap(), CoercedValue::Null);
    }

    #[test]
    fn empty_string_is_rejected_when_not_nullable() {
        let err = coerce_for_column(&json!(""), &column(SqlType::Int, false)).unwrap_err();
        assert!(matches!(err, QueryError::TypeValidation { .. }));
    }

    #[test]
    fn boolean_word_sets() {
        for accepted in [json!("yes"), json!("1"), json!(true), json!(1), json!("TRUE")] {
            assert_eq!(
                coerce(accepted, SqlType::Boolean).unwrap(),
                CoercedValue::Bool(true)
            );
        }
        for rejected_true in [json!("no"), json!("0"), json!(false), json!(0)] {
            assert_eq!(
                coerce(rejected_true, SqlType::Boolean).unwrap(),
                CoercedValue::Bool(false)
            );
        }
        let err = coerce(json!("maybe"), SqlType::Boolean).unwrap_err();
        match err {
            QueryError::TypeValidation { column, .. } => assert_eq!(column, "field"),
            other => panic!("expected TypeValidation, got {other:?}"),
        }
    }

    #[test]
    fn tinyint_coerces_to_integers() {
        assert_eq!(coerce(json!("yes"), SqlType::TinyInt).unwrap(), CoercedValue::Int(1));
        assert_eq!(coerce(json!(false), SqlType::TinyInt).unwrap(), CoercedValue::Int(0));
        assert_eq!(coerce(json!("2"), SqlType::TinyInt).unwrap(), CoercedValue::Int(2));
    }

    #[test]
    fn integers_truncate_and_reject_words() {
        assert_eq!(coerce(json!("42"), SqlType::Int).unwrap(), CoercedValue::Int(42));
        assert_eq!(coerce(json!(" 3.9 "), SqlType::BigInt).unwrap(), CoercedValue::Int(3));
        assert_eq!(coerce(json!(7.9), SqlType::Int).unwrap(), CoercedValue::Int(7));
        assert!(coerce(json!("forty"), SqlType::Int).is_err());
        assert!(coerce(json!(true), SqlType::Int).is_err());
    }

    #[test]
    fn floats_accept_numeric_strings() {
        assert_eq!(
            coerce(json!("1500.50"), SqlType::Decimal).unwrap(),
            CoercedValue::Float(1500.5)
        );
        assert!(coerce(json!("cheap"), SqlType::Double).is_err());
    }

    #[test]
    fn dates_reformat_day_first_and_reject_garbage() {
        assert_eq!(
            coerce(json!("15/05/1998"), SqlType::Date).unwrap(),
            CoercedValue::Text("1998-05-15".to_string())
        );
        assert_eq!(
            coerce(json!("1998-05-15"), SqlType::Date).unwrap(),
            CoercedValue::Text("1998-05-15".to_string())
        );
        assert!(coerce(json!("1998-15-05"), SqlType::Date).is_err());
    }

    #[test]
    fn datetimes_default_missing_seconds() {
        assert_eq!(
            coerce(json!("1998-05-15 10:30"), SqlType::DateTime).unwrap(),
            CoercedValue::Text("1998-05-15 10:30:00".to_string())
        );
        assert!(coerce(json!("soon"), SqlType::Timestamp).is_err());
    }

    #[test]
    fn time_minutes_gain_seconds() {
        assert_eq!(
            coerce(json!("10:30"), SqlType::Time).unwrap(),
            CoercedValue::Text("10:30:00".to_string())
        );
        assert!(coerce(json!("10h30"), SqlType::Time).is_err());
    }

    #[test]
    fn year_window_bounds() {
        assert!(coerce(json!(1900), SqlType::Year).is_err());
        assert_eq!(coerce(json!(1901), SqlType::Year).unwrap(), CoercedValue::Int(1901));
        assert_eq!(coerce(json!("2155"), SqlType::Year).unwrap(), CoercedValue::Int(2155));
        assert!(coerce(json!(2156), SqlType::Year).is_err());
    }

    #[test]
    fn text_trims_and_stringifies() {
        assert_eq!(
            coerce(json!("  padded  "), SqlType::VarChar).unwrap(),
            CoercedValue::Text("padded".to_string())
        );
        assert_eq!(
            coerce(json!(25), SqlType::Text).unwrap(),
            CoercedValue::Text("25".to_string())
        );
        assert_eq!(
            coerce(json!(true), SqlType::Char).unwrap(),
            CoercedValue::Text("1".to_string())
        );
        assert!(coerce(json!([1]), SqlType::VarChar).is_err());
    }

    #[test]
    fn json_strings_must_parse_and_structures_serialize() {
        assert_eq!(
            coerce(json!(r#"{"a":1}"#), SqlType::Json).unwrap(),
            CoercedValue::Text(r#"{"a":1}"#.to_string())
        );
        assert_eq!(
            coerce(json!({"a": 1}), SqlType::Json).unwrap(),
            CoercedValue::Json(json!({"a": 1}))
        );
        assert!(coerce(json!("{not json"), SqlType::Json).is_err());
    }

    #[test]
    fn coercion_is_idempotent_on_canonical_output() {
        let cases = [
            (json!("15/05/1998"), SqlType::Date),
            (json!("yes"), SqlType::Boolean),
            (json!("42"), SqlType::Int),
            (json!("1.5"), SqlType::Float),
            (json!(" text "), SqlType::VarChar),
            (json!("10:30"), SqlType::Time),
            (json!(2000), SqlType::Year),
        ];
        for (input, ty) in cases {
            let first = coerce(input, ty).unwrap();
            let reinput = match &first {
                CoercedValue::Int(n) => json!(n),
                CoercedValue::Float(f) => json!(f),
                CoercedValue::Bool(b) => json!(b),
                CoercedValue::Text(s) => json!(s),
                other => panic!("unexpected canonical form {other:?}"),
            };
            let second = coerce(reinput, ty).unwrap();
            assert_eq!(first, second, "coercion not idempotent for {ty:?}");
        }
    }
}
