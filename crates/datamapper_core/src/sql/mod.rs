//! SQL text generation and field visitors.
//!
//! # Responsibility
//! - Turn mapping descriptors into canonical SQLite statements.
//! - Provide the visitors that bind entity fields to statements and rows.
//!
//! # Invariants
//! - Only one SQL dialect (SQLite) is produced.

pub mod statement_builder;
pub mod visitors;

pub use statement_builder::{ColumnSchema, StatementBuilder, TableSchema};
