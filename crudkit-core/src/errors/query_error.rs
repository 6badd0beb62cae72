//! Errors raised while building or executing CRUD statements.

use super::error_code::{self, CrudErrorCode};

/// Errors that can occur while building or executing a statement.
///
/// Cache failures never surface here — the cache degrades to a miss.
/// Read-path driver failures are downgraded to an empty result by the
/// builder; write-path driver failures propagate as `Driver`.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("cannot describe table {table}: no accessible columns")]
    Schema { table: String },

    #[error("invalid value for column {column}: {reason}")]
    TypeValidation { column: String, reason: String },

    #[error("required fields not supplied for {table}: {}", .columns.join(", "))]
    RequiredFields { table: String, columns: Vec<String> },

    #[error("operation requires an authenticated actor")]
    Authentication,

    #[error("statement contains forbidden SQL: {token}")]
    ForbiddenStatement { token: String },

    #[error("driver error: {message}")]
    Driver { message: String },
}

impl CrudErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Schema { .. } => error_code::SCHEMA_ERROR,
            Self::TypeValidation { .. } => error_code::TYPE_VALIDATION,
            Self::RequiredFields { .. } => error_code::REQUIRED_FIELDS,
            Self::Authentication => error_code::AUTHENTICATION,
            Self::ForbiddenStatement { .. } => error_code::FORBIDDEN_STATEMENT,
            Self::Driver { .. } => error_code::DRIVER_ERROR,
        }
    }
}
