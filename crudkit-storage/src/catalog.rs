//! Schema introspection over SQLite's catalog.

use crudkit_core::errors::QueryError;
use crudkit_core::traits::SchemaCatalog;
use crudkit_core::types::column::ColumnMetadata;
use crudkit_core::types::sql_type::SqlType;

use crate::driver::{driver_error, SharedConnection};

/// Catalog source reading `pragma_table_info`, sharing the driver's
/// connection.
pub struct SqliteCatalog {
    conn: SharedConnection,
}

impl SqliteCatalog {
    /// A catalog over the same database the driver executes against.
    pub fn new(driver: &crate::driver::SqliteDriver) -> Self {
        Self {
            conn: driver.shared(),
        }
    }
}

impl SchemaCatalog for SqliteCatalog {
    fn columns(&self, table: &str, excluded: &[&str]) -> Result<Vec<ColumnMetadata>, QueryError> {
        let guard = self
            .conn
            .lock()
            .map_err(|_| driver_error("connection mutex poisoned"))?;

        let mut stmt = guard
            .prepare("SELECT name, type, \"notnull\", dflt_value FROM pragma_table_info(?1)")
            .map_err(driver_error)?;

        let rows = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(driver_error)?;

        let mut columns = Vec::new();
        for row in rows {
            let (name, declared, notnull, default) = row.map_err(driver_error)?;
            if excluded.iter().any(|e| e.eq_ignore_ascii_case(&name)) {
                continue;
            }
            columns.push(ColumnMetadata {
                declared_type: SqlType::from_declared(&declared),
                nullable: notnull == 0,
                has_default: default.is_some(),
                name,
            });
        }

        // Zero describable columns is indistinguishable from a missing table.
        if columns.is_empty() {
            return Err(QueryError::Schema {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SqliteDriver;
    use crudkit_core::traits::Driver;

    fn catalog_with(ddl: &str) -> SqliteCatalog {
        let driver = SqliteDriver::open_in_memory().unwrap();
        driver.query(ddl).unwrap();
        SqliteCatalog::new(&driver)
    }

    #[test]
    fn reports_types_nullability_and_defaults_in_order() {
        let catalog = catalog_with(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                email VARCHAR(255) NOT NULL,
                age INT,
                is_active TINYINT(1) NOT NULL DEFAULT 1
            )",
        );
        let columns = catalog.columns("users", &[]).unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "email", "age", "is_active"]);

        let email = &columns[1];
        assert_eq!(email.declared_type, SqlType::VarChar);
        assert!(!email.nullable);
        assert!(!email.has_default);

        let active = &columns[3];
        assert_eq!(active.declared_type, SqlType::TinyInt);
        assert!(active.has_default);
    }

    #[test]
    fn exclusion_filters_are_case_insensitive() {
        let catalog = catalog_with("CREATE TABLE t (id INTEGER, name TEXT)");
        let columns = catalog.columns("t", &["ID"]).unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "name");
    }

    #[test]
    fn missing_table_is_a_schema_error() {
        let catalog = catalog_with("CREATE TABLE t (id INTEGER)");
        let err = catalog.columns("nope", &[]).unwrap_err();
        assert!(matches!(err, QueryError::Schema { table } if table == "nope"));
    }

    #[test]
    fn excluding_every_column_is_a_schema_error() {
        let catalog = catalog_with("CREATE TABLE t (id INTEGER)");
        assert!(catalog.columns("t", &["id"]).is_err());
    }
}
