//! # crudkit-core
//!
//! Foundation crate for the crudkit query layer.
//! Defines the value model, column metadata, error taxonomy, cache config,
//! the two coercion strategies, and the collaborator traits the storage
//! crate implements.

pub mod coerce;
pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::CacheConfig;
pub use errors::error_code::CrudErrorCode;
pub use errors::QueryError;
pub use types::actor::ActorContext;
pub use types::column::ColumnMetadata;
pub use types::sql_type::SqlType;
pub use types::statement::{BuiltStatement, ParamBinding};
pub use types::value::{CoercedValue, ParamMap, Row, RowSet};
