//! The four CRUD builder operations: dynamic filtered read, scoped insert,
//! scoped update, soft delete.
//!
//! The builder owns no state — driver, catalog, cache, and actor are
//! injected per construction/call, so one builder is one logical operation
//! context and nothing leaks between sessions.

pub mod assembly;
pub mod params;
pub mod sanitize;
pub mod table;

use chrono::Local;
use serde_json::Value;
use tracing::{debug, warn};

use crudkit_core::coerce::{coerce_for_column, coerce_scalar};
use crudkit_core::errors::QueryError;
use crudkit_core::traits::{Driver, SchemaCatalog};
use crudkit_core::types::actor::ActorContext;
use crudkit_core::types::statement::{BuiltStatement, ParamBinding};
use crudkit_core::types::value::{CoercedValue, ParamMap, RowSet};

use crate::cache::QueryCache;
use crate::row_security;
use assembly::QueryAssembly;
use params::filter_bindings;
use sanitize::sanitize_statement;
use table::{HeuristicTableResolver, TableResolver};

/// Columns stamped automatically and therefore never taken from the caller
/// on insert.
const INSERT_EXCLUDED: [&str; 6] = [
    "id",
    "is_active",
    "created_by",
    "updated_by",
    "created_at",
    "updated_at",
];

/// Columns an update may never touch; `updated_by`/`updated_at` stay
/// writable because the builder forces them itself.
const UPDATE_EXCLUDED: [&str; 4] = ["id", "is_active", "created_by", "created_at"];

static DEFAULT_RESOLVER: HeuristicTableResolver = HeuristicTableResolver;

/// Builds and executes CRUD statements against injected collaborators.
pub struct QueryBuilder<'a> {
    driver: &'a dyn Driver,
    catalog: &'a dyn SchemaCatalog,
    cache: Option<&'a QueryCache>,
    resolver: &'a dyn TableResolver,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(driver: &'a dyn Driver, catalog: &'a dyn SchemaCatalog) -> Self {
        Self {
            driver,
            catalog,
            cache: None,
            resolver: &DEFAULT_RESOLVER,
        }
    }

    /// Enable result caching for the read path.
    pub fn with_cache(mut self, cache: &'a QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Swap the primary-table heuristic.
    pub fn with_resolver(mut self, resolver: &'a dyn TableResolver) -> Self {
        self.resolver = resolver;
        self
    }

    // ─── read path ──────────────────────────────────────────────────────

    /// Dynamic filtered read.
    ///
    /// `template` is a SELECT carrying a literal `{filter}` token and
    /// optional `:name` placeholders; `params` mixes filter directives
    /// (`id`, `where`, `and`, `order`/`ordination`, `like`/`value`,
    /// `limit`, `page`/`limit2`) with scalar placeholder values.
    ///
    /// Driver failures on this path degrade to an empty result set; only
    /// sanitization and coercion problems surface as errors.
    pub fn run_query(
        &self,
        template: &str,
        params: &ParamMap,
        actor: Option<&ActorContext>,
        ignore_cache: bool,
    ) -> Result<RowSet, QueryError> {
        if params.is_empty() {
            let sql = QueryAssembly::new(sanitize_statement(template)?).render();
            return Ok(self.driver.query(&sql).unwrap_or_else(|e| {
                warn!("read failed, returning no rows: {e}");
                Vec::new()
            }));
        }

        let statement = self.build_read(template, params, actor)?;

        let key = self
            .cache
            .filter(|cache| cache.is_enabled())
            .map(|_| QueryCache::key_for(&statement.sql, &statement.bindings));

        if !ignore_cache {
            if let (Some(cache), Some(key)) = (self.cache, key) {
                if let Some(rows) = cache.get_cache(key) {
                    debug!("cache hit for read query");
                    return Ok(rows);
                }
            }
        }

        match self.driver.select(&statement.sql, &statement.bindings) {
            Ok(rows) => {
                if let (Some(cache), Some(key)) = (self.cache, key) {
                    cache.set_cache(key, &rows);
                }
                Ok(rows)
            }
            Err(e) => {
                warn!("read failed, returning no rows: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Assemble the final read statement without executing it: sanitize,
    /// inject row security, apply directives in their fixed order, render,
    /// and narrow bindings to the placeholders the text references.
    pub fn build_read(
        &self,
        template: &str,
        params: &ParamMap,
        actor: Option<&ActorContext>,
    ) -> Result<BuiltStatement, QueryError> {
        let sanitized = sanitize_statement(template)?;

        // Every parameter becomes a candidate binding; directives that never
        // appear as :placeholders are filtered out against the final text.
        let bindings: Vec<ParamBinding> = params
            .iter()
            .map(|(key, value)| ParamBinding::new(key.clone(), coerce_scalar(value)))
            .collect();

        let table = self.resolver.primary_table(&sanitized).unwrap_or_default();

        let mut query = QueryAssembly::new(sanitized);

        if let Some(actor) = actor {
            if let Some(fragment) = row_security::filter_fragment(self.driver, actor, &table) {
                query.security(fragment);
            }
        }

        if let Some(id) = params.get("id") {
            query.condition(format!("{table}.id IN ({})", directive_text(id)));
        }

        if let Some(pairs) = params.get("where").and_then(Value::as_str) {
            query.or_group(qualified_pairs(&table, pairs));
            // AND-groups only apply on top of a where-group.
            if let Some(groups) = params.get("and").and_then(Value::as_array) {
                for group in groups.iter().filter_map(Value::as_str) {
                    query.or_group(qualified_pairs(&table, group));
                }
            }
        }

        if let (Some(order), Some(ordination)) = (
            params.get("order").and_then(Value::as_str),
            params.get("ordination").and_then(Value::as_str),
        ) {
            query.order_by(format!("{table}.{order} {ordination}"));
        }

        if let (Some(column), Some(pattern)) = (
            params.get("like").and_then(Value::as_str),
            params.get("value"),
        ) {
            query.like_wrap(column.to_string(), directive_text(pattern));
        }

        let limit = directive_u64(params.get("limit")).unwrap_or(100).min(1000);
        let page = directive_u64(params.get("page")).unwrap_or(1).max(1);
        let page_size = directive_u64(params.get("limit2")).unwrap_or(100);
        query.pagination(limit, (page - 1) * page_size);

        let sql = query.render();
        let bindings = filter_bindings(&sql, bindings);
        Ok(BuiltStatement { sql, bindings })
    }

    // ─── write paths ────────────────────────────────────────────────────

    /// Scoped insert. Validates required columns, strictly coerces every
    /// supplied value, stamps `created_by`/`updated_by`, and returns the
    /// generated id.
    pub fn run_insert(
        &self,
        table: &str,
        object: &ParamMap,
        actor: Option<&ActorContext>,
    ) -> Result<i64, QueryError> {
        let columns = self.catalog.columns(table, &INSERT_EXCLUDED)?;

        let mut missing = Vec::new();
        let mut names = Vec::new();
        let mut bindings = Vec::new();

        for column in &columns {
            match object.get(&column.name).filter(|v| is_supplied(v)) {
                Some(value) => {
                    let coerced = coerce_for_column(value, column)?;
                    names.push(column.name.clone());
                    bindings.push(ParamBinding::new(column.name.clone(), coerced));
                }
                None => {
                    if !column.nullable && !column.has_default {
                        missing.push(column.name.clone());
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(QueryError::RequiredFields {
                table: table.to_string(),
                columns: missing,
            });
        }

        let actor_id = actor.map(|a| a.id).unwrap_or(0);
        for stamp in ["created_by", "updated_by"] {
            names.push(stamp.to_string());
            bindings.push(ParamBinding::new(stamp, CoercedValue::Int(actor_id)));
        }

        let placeholders: Vec<String> = names.iter().map(|n| format!(":{n}")).collect();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            names.join(", "),
            placeholders.join(", ")
        );
        self.driver.insert(&sql, &bindings)
    }

    /// Scoped update. Forces `updated_by`/`updated_at`, strictly coerces
    /// supplied values, and updates every row in the (possibly
    /// comma-joined) id list. Returns the affected-row count.
    pub fn run_update(
        &self,
        table: &str,
        object: &ParamMap,
        actor: Option<&ActorContext>,
    ) -> Result<u64, QueryError> {
        let columns = self.catalog.columns(table, &UPDATE_EXCLUDED)?;

        let id_list = object
            .get("id")
            .filter(|v| !v.is_null())
            .map(directive_text)
            .ok_or_else(|| QueryError::TypeValidation {
                column: "id".to_string(),
                reason: "update requires an id or comma-joined id list".to_string(),
            })?;

        let mut object = object.clone();
        let actor_id = actor.map(|a| a.id).unwrap_or(0);
        object.insert("updated_by".to_string(), Value::from(actor_id));
        object.insert(
            "updated_at".to_string(),
            Value::String(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );

        let mut assignments = Vec::new();
        let mut bindings = Vec::new();
        for column in &columns {
            let Some(value) = object.get(&column.name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let coerced = coerce_for_column(value, column)?;
            assignments.push(format!("{} = :{}", column.name, column.name));
            bindings.push(ParamBinding::new(column.name.clone(), coerced));
        }

        let sql = format!(
            "UPDATE {table} SET {} WHERE id IN ({id_list})",
            assignments.join(", ")
        );
        self.driver.update(&sql, &bindings)
    }

    /// Soft delete: flips `is_active` off for every id, stamping the actor,
    /// then re-selects and returns the affected rows. Requires an actor.
    pub fn run_delete(
        &self,
        table: &str,
        ids: &[String],
        actor: Option<&ActorContext>,
    ) -> Result<RowSet, QueryError> {
        let actor = actor.ok_or(QueryError::Authentication)?;

        let id_list: Vec<String> = ids
            .iter()
            .map(|id| format!("'{}'", id.replace('\'', "''")))
            .collect();
        let id_list = id_list.join(", ");

        self.driver.update(
            &format!(
                "UPDATE {table} SET is_active = false, updated_by = {} WHERE id IN ({id_list})",
                actor.id
            ),
            &[],
        )?;

        self.driver
            .query(&format!("SELECT * FROM {table} WHERE id IN ({id_list})"))
    }
}

/// A value is supplied when it is present, non-null, and not an empty
/// string — the same test the required-columns check uses.
fn is_supplied(value: &Value) -> bool {
    !(value.is_null() || value.as_str() == Some(""))
}

/// Render a directive value into SQL text: strings as-is, numbers
/// stringified.
fn directive_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a numeric directive (`limit`, `page`, `limit2`) from a number or a
/// numeric string.
fn directive_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Split a `|`-delimited list of `column;value` pairs into qualified
/// `table.column=value` expressions.
fn qualified_pairs(table: &str, list: &str) -> Vec<String> {
    list.split('|')
        .filter(|pair| !pair.is_empty())
        .map(|pair| format!("{table}.{}", pair.replace(';', "=")))
        .collect()
}
