//! Object-relational mapping core over SQLite.
//! Mappings describe entities once; SQL text, binding and persistence rules
//! are derived from that description.

pub mod db;
pub mod logging;
pub mod mapping;
pub mod repo;
pub mod sql;

pub use rusqlite;

pub use db::{connect, connect_in_memory, ConnectOptions, DbError, DbResult, TransactionScope};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LogSettings,
};
pub use mapping::{
    Entity, Field, FieldDescriptor, FieldVisitor, Mapping, MappingError, SqlType, UNSET_ID,
};
pub use repo::{LookupKey, RepoError, RepoResult, Repository, StatementKind};
pub use sql::{StatementBuilder, TableSchema};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
