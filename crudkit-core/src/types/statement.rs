//! Built statements and their parameter bindings.

use serde::{Deserialize, Serialize};

use super::value::CoercedValue;

/// One named parameter bound to a statement, referenced as `:column` in the
/// SQL text. Unique by column name within a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamBinding {
    pub column: String,
    pub value: CoercedValue,
}

impl ParamBinding {
    pub fn new(column: impl Into<String>, value: CoercedValue) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// A fully assembled statement, produced fresh per call and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    pub sql: String,
    pub bindings: Vec<ParamBinding>,
}
