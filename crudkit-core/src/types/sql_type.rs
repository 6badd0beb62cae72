//! Declared SQL column types and their parsing from catalog strings.

use serde::{Deserialize, Serialize};

/// A column's declared storage type, as reported by the catalog.
///
/// Each variant has exactly one coercion rule (see `coerce::strict`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    Bit,
    TinyInt,
    Boolean,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Decimal,
    Float,
    Double,
    Date,
    DateTime,
    Timestamp,
    Time,
    Year,
    Char,
    VarChar,
    TinyText,
    Text,
    MediumText,
    LongText,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Json,
}

impl SqlType {
    /// Parse a declared-type string from the catalog, e.g. `VARCHAR(255)`,
    /// `int unsigned`, `TEXT`.
    ///
    /// Only the leading keyword is significant; length/precision suffixes and
    /// modifiers are ignored. Unknown or empty declarations fall back to
    /// `Text`, which coerces values to trimmed strings — the least surprising
    /// treatment for a column the catalog cannot classify.
    pub fn from_declared(declared: &str) -> Self {
        let keyword = declared
            .trim()
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();

        match keyword.as_str() {
            "BIT" => Self::Bit,
            "TINYINT" => Self::TinyInt,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "SMALLINT" => Self::SmallInt,
            "MEDIUMINT" => Self::MediumInt,
            "INT" | "INTEGER" => Self::Int,
            "BIGINT" => Self::BigInt,
            "DECIMAL" | "NUMERIC" => Self::Decimal,
            "FLOAT" => Self::Float,
            "DOUBLE" | "REAL" => Self::Double,
            "DATE" => Self::Date,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            "TIME" => Self::Time,
            "YEAR" => Self::Year,
            "CHAR" => Self::Char,
            "VARCHAR" => Self::VarChar,
            "TINYTEXT" => Self::TinyText,
            "TEXT" => Self::Text,
            "MEDIUMTEXT" => Self::MediumText,
            "LONGTEXT" => Self::LongText,
            "TINYBLOB" => Self::TinyBlob,
            "BLOB" => Self::Blob,
            "MEDIUMBLOB" => Self::MediumBlob,
            "LONGBLOB" => Self::LongBlob,
            "JSON" => Self::Json,
            _ => Self::Text,
        }
    }

    /// True for the integer family (`TinyInt` through `BigInt`), which
    /// coerces to `CoercedValue::Int`.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::MediumInt | Self::Int | Self::BigInt
        )
    }

    /// True for the floating family, which coerces to `CoercedValue::Float`.
    pub fn is_floating(self) -> bool {
        matches!(self, Self::Decimal | Self::Float | Self::Double)
    }

    /// True for character data, which coerces to `CoercedValue::Text`.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::VarChar
                | Self::TinyText
                | Self::Text
                | Self::MediumText
                | Self::LongText
        )
    }

    /// True for binary data, which passes through uncoerced.
    pub fn is_blob(self) -> bool {
        matches!(
            self,
            Self::TinyBlob | Self::Blob | Self::MediumBlob | Self::LongBlob
        )
    }
}
