//! rusqlite-backed implementation of the driver collaborator.
//!
//! The single owner of the raw connection; nothing outside this module and
//! the catalog touches `rusqlite::Connection` directly.

use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;

use crudkit_core::errors::QueryError;
use crudkit_core::traits::Driver;
use crudkit_core::types::statement::ParamBinding;
use crudkit_core::types::value::{CoercedValue, Row, RowSet};

/// Shared handle to one SQLite connection, split between driver and catalog.
pub(crate) type SharedConnection = Arc<Mutex<Connection>>;

/// `QueryError::Driver` from any displayable failure.
pub(crate) fn driver_error(e: impl std::fmt::Display) -> QueryError {
    QueryError::Driver {
        message: e.to_string(),
    }
}

/// Driver over a single SQLite connection.
pub struct SqliteDriver {
    conn: SharedConnection,
}

impl SqliteDriver {
    /// Open a file-backed database.
    pub fn open(path: &Path) -> Result<Self, QueryError> {
        let conn = Connection::open(path).map_err(driver_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, QueryError> {
        let conn = Connection::open_in_memory().map_err(driver_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Hand out the shared connection so the catalog can introspect the
    /// same database.
    pub(crate) fn shared(&self) -> SharedConnection {
        Arc::clone(&self.conn)
    }

    /// Run a batch of semicolon-separated statements without parameters.
    /// Raw access for schema setup and migrations — CRUD goes through the
    /// builder.
    pub fn execute_batch(&self, sql: &str) -> Result<(), QueryError> {
        self.with_conn(|conn| conn.execute_batch(sql).map_err(driver_error))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        let guard = self
            .conn
            .lock()
            .map_err(|_| driver_error("connection mutex poisoned"))?;
        f(&guard)
    }
}

impl Driver for SqliteDriver {
    fn query(&self, sql: &str) -> Result<RowSet, QueryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(driver_error)?;
            collect_rows(&mut stmt, &[])
        })
    }

    fn select(&self, sql: &str, bindings: &[ParamBinding]) -> Result<RowSet, QueryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(driver_error)?;
            collect_rows(&mut stmt, bindings)
        })
    }

    fn insert(&self, sql: &str, bindings: &[ParamBinding]) -> Result<i64, QueryError> {
        self.with_conn(|conn| {
            let named = named_params(bindings);
            conn.execute(sql, params_ref(&named).as_slice())
                .map_err(driver_error)?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn update(&self, sql: &str, bindings: &[ParamBinding]) -> Result<u64, QueryError> {
        self.with_conn(|conn| {
            let named = named_params(bindings);
            let affected = conn
                .execute(sql, params_ref(&named).as_slice())
                .map_err(driver_error)?;
            Ok(affected as u64)
        })
    }
}

fn collect_rows(
    stmt: &mut rusqlite::Statement<'_>,
    bindings: &[ParamBinding],
) -> Result<RowSet, QueryError> {
    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
    let named = named_params(bindings);
    let mut rows = stmt
        .query(params_ref(&named).as_slice())
        .map_err(driver_error)?;

    let mut result = Vec::new();
    while let Some(row) = rows.next().map_err(driver_error)? {
        let mut out = Row::new();
        for (i, name) in names.iter().enumerate() {
            let value = row.get_ref(i).map_err(driver_error)?;
            out.insert(name.clone(), json_of(value));
        }
        result.push(out);
    }
    Ok(result)
}

/// Materialize bindings as `(":name", value)` pairs for rusqlite.
fn named_params(bindings: &[ParamBinding]) -> Vec<(String, rusqlite::types::Value)> {
    bindings
        .iter()
        .map(|b| (format!(":{}", b.column), sql_value(&b.value)))
        .collect()
}

fn params_ref(named: &[(String, rusqlite::types::Value)]) -> Vec<(&str, &dyn rusqlite::ToSql)> {
    named
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn rusqlite::ToSql))
        .collect()
}

fn sql_value(value: &CoercedValue) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        CoercedValue::Null => Sql::Null,
        CoercedValue::Int(i) => Sql::Integer(*i),
        CoercedValue::Float(f) => Sql::Real(*f),
        CoercedValue::Bool(b) => Sql::Integer(i64::from(*b)),
        CoercedValue::Text(s) => Sql::Text(s.clone()),
        CoercedValue::Bytes(b) => Sql::Blob(b.clone()),
        CoercedValue::Json(v) => Sql::Text(v.to_string()),
    }
}

fn json_of(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(BASE64.encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_binds_named_params_and_maps_rows() {
        let driver = SqliteDriver::open_in_memory().unwrap();
        driver
            .query("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
            .unwrap();
        let id = driver
            .insert(
                "INSERT INTO t (name, score) VALUES (:name, :score)",
                &[
                    ParamBinding::new("name", CoercedValue::Text("ada".to_string())),
                    ParamBinding::new("score", CoercedValue::Float(9.5)),
                ],
            )
            .unwrap();
        assert_eq!(id, 1);

        let rows = driver
            .select(
                "SELECT * FROM t WHERE id = :id",
                &[ParamBinding::new("id", CoercedValue::Int(1))],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Value::String("ada".to_string()));
        assert_eq!(rows[0]["score"], serde_json::json!(9.5));
    }

    #[test]
    fn update_reports_affected_rows() {
        let driver = SqliteDriver::open_in_memory().unwrap();
        driver.query("CREATE TABLE t (id INTEGER PRIMARY KEY, v INTEGER)").unwrap();
        for _ in 0..3 {
            driver
                .insert("INSERT INTO t (v) VALUES (:v)", &[ParamBinding::new("v", CoercedValue::Int(0))])
                .unwrap();
        }
        let affected = driver
            .update("UPDATE t SET v = :v", &[ParamBinding::new("v", CoercedValue::Int(1))])
            .unwrap();
        assert_eq!(affected, 3);
    }

    #[test]
    fn failures_surface_as_driver_errors() {
        let driver = SqliteDriver::open_in_memory().unwrap();
        let err = driver.query("SELECT * FROM missing_table").unwrap_err();
        assert!(matches!(err, QueryError::Driver { .. }));
    }
}
