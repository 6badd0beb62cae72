//! Schema catalog source.

use crate::errors::QueryError;
use crate::types::column::ColumnMetadata;

/// Fetches live column metadata for a table.
///
/// Results follow the table's natural column order. Implementations must
/// fail with `QueryError::Schema` when the table has no describable columns
/// after exclusion — indistinguishable from "table not found".
pub trait SchemaCatalog: Send + Sync {
    fn columns(&self, table: &str, excluded: &[&str]) -> Result<Vec<ColumnMetadata>, QueryError>;
}
