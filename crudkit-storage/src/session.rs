//! One logical database session: driver + catalog + cache + actor identity,
//! explicitly constructed and threaded through every call.

use std::path::Path;

use crudkit_core::config::CacheConfig;
use crudkit_core::errors::QueryError;
use crudkit_core::traits::{Driver, SchemaCatalog};
use crudkit_core::types::actor::ActorContext;
use crudkit_core::types::value::{ParamMap, RowSet};

use crate::builder::QueryBuilder;
use crate::cache::QueryCache;
use crate::catalog::SqliteCatalog;
use crate::driver::SqliteDriver;

/// The session façade routing the four logical operations to the builder.
///
/// Each session owns its own driver handle and actor identity; there is no
/// process-wide connection or ambient user.
pub struct Session {
    driver: Box<dyn Driver>,
    catalog: Box<dyn SchemaCatalog>,
    cache: QueryCache,
    actor: Option<ActorContext>,
}

impl Session {
    /// Assemble a session from explicit collaborators.
    pub fn new(
        driver: Box<dyn Driver>,
        catalog: Box<dyn SchemaCatalog>,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            driver,
            catalog,
            cache: QueryCache::new(cache),
            actor: None,
        }
    }

    /// Open a file-backed SQLite session.
    pub fn open(path: &Path, cache: &CacheConfig) -> Result<Self, QueryError> {
        let driver = SqliteDriver::open(path)?;
        let catalog = SqliteCatalog::new(&driver);
        Ok(Self::new(Box::new(driver), Box::new(catalog), cache))
    }

    /// Open an in-memory SQLite session with caching disabled (for testing).
    pub fn open_in_memory() -> Result<Self, QueryError> {
        let driver = SqliteDriver::open_in_memory()?;
        let catalog = SqliteCatalog::new(&driver);
        Ok(Self::new(
            Box::new(driver),
            Box::new(catalog),
            &CacheConfig::disabled(),
        ))
    }

    /// Attach an actor identity to this session.
    pub fn with_actor(mut self, actor: ActorContext) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn actor(&self) -> Option<&ActorContext> {
        self.actor.as_ref()
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self.driver.as_ref(), self.catalog.as_ref()).with_cache(&self.cache)
    }

    /// Dynamic filtered read; see [`QueryBuilder::run_query`].
    pub fn run_query(
        &self,
        template: &str,
        params: &ParamMap,
        ignore_cache: bool,
    ) -> Result<RowSet, QueryError> {
        self.builder()
            .run_query(template, params, self.actor.as_ref(), ignore_cache)
    }

    /// Scoped insert; returns the generated id.
    pub fn run_insert(&self, table: &str, object: &ParamMap) -> Result<i64, QueryError> {
        self.builder().run_insert(table, object, self.actor.as_ref())
    }

    /// Scoped update; returns the affected-row count.
    pub fn run_update(&self, table: &str, object: &ParamMap) -> Result<u64, QueryError> {
        self.builder().run_update(table, object, self.actor.as_ref())
    }

    /// Soft delete; returns the rows as they stand after deletion.
    pub fn run_delete(&self, table: &str, ids: &[String]) -> Result<RowSet, QueryError> {
        self.builder().run_delete(table, ids, self.actor.as_ref())
    }

    /// Drop every cached read result.
    pub fn clear_cache(&self) -> bool {
        self.cache.clear_cache()
    }
}
