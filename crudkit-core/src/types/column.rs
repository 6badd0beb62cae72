//! Column metadata snapshots from the catalog.

use serde::{Deserialize, Serialize};

use super::sql_type::SqlType;

/// One column's metadata as reported by the catalog at call time.
///
/// Snapshots are fetched fresh for every operation and never cached, so they
/// always reflect the current catalog state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub declared_type: SqlType,
    pub nullable: bool,
    pub has_default: bool,
}
