//! Execution boundary to the underlying database driver.

use crate::errors::QueryError;
use crate::types::statement::ParamBinding;
use crate::types::value::RowSet;

/// The driver collaborator: executes finished statements.
///
/// Connection management, statement preparation, and parameter binding
/// mechanics live behind this trait. The builder never sees a raw
/// connection. All failures surface as `QueryError::Driver`.
pub trait Driver: Send + Sync {
    /// Run an unparameterized statement and return its rows.
    fn query(&self, sql: &str) -> Result<RowSet, QueryError>;

    /// Run a parameterized SELECT; bindings are referenced as `:column`.
    fn select(&self, sql: &str, bindings: &[ParamBinding]) -> Result<RowSet, QueryError>;

    /// Run a parameterized INSERT and return the generated row id.
    fn insert(&self, sql: &str, bindings: &[ParamBinding]) -> Result<i64, QueryError>;

    /// Run a parameterized UPDATE and return the affected row count.
    fn update(&self, sql: &str, bindings: &[ParamBinding]) -> Result<u64, QueryError>;
}
