//! Stable error codes surfaced across the API boundary.
//!
//! Codes are part of the public contract — callers match on these strings,
//! so they never change even when display messages do.

pub const SCHEMA_ERROR: &str = "SCHEMA_ERROR";
pub const TYPE_VALIDATION: &str = "TYPE_VALIDATION";
pub const REQUIRED_FIELDS: &str = "REQUIRED_FIELDS";
pub const AUTHENTICATION: &str = "AUTHENTICATION";
pub const FORBIDDEN_STATEMENT: &str = "FORBIDDEN_STATEMENT";
pub const DRIVER_ERROR: &str = "DRIVER_ERROR";

/// Maps an error to its stable code.
pub trait CrudErrorCode {
    fn error_code(&self) -> &'static str;
}
