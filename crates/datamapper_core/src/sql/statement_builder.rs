//! Canonical SQL text for one mapping.
//!
//! # Responsibility
//! - Generate create/insert/update/select/delete statements from a mapping.
//! - Describe the mapped table as a serializable schema snapshot.
//!
//! # Invariants
//! - Output is a pure function of the mapping; no I/O happens here.
//! - Column order in every statement equals `Mapping::accept` order.
//! - Every table gets `id INTEGER PRIMARY KEY AUTOINCREMENT` as column 0.

use crate::mapping::{field_descriptors, Mapping, SqlType};
use crate::sql::visitors::{FieldDeclarationBuilder, InsertColumnBuilder, UpdateAssignmentBuilder};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

const ID_COLUMN_DECLARATION: &str = "id INTEGER PRIMARY KEY AUTOINCREMENT";

/// One column of a mapped table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Column type text as emitted in DDL (`INTEGER` for the id column).
    pub column_type: String,
    /// `None` for the id column, which has a fixed declaration.
    pub sql_type: Option<SqlType>,
    pub options: String,
}

/// Introspection snapshot of a mapped table, id column first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnSchema>,
    /// Custom DDL appended after `CREATE TABLE`, if any.
    pub custom_statements: Option<String>,
}

/// Statement generator for mapping `M`. Only used through its associated
/// functions.
pub struct StatementBuilder<M: Mapping> {
    _mapping: PhantomData<M>,
}

impl<M: Mapping> StatementBuilder<M> {
    pub fn create_table_statement() -> String {
        let mut declarations = FieldDeclarationBuilder::default();
        M::accept(&mut declarations);

        let mut columns = vec![ID_COLUMN_DECLARATION.to_string()];
        columns.extend(declarations.into_fragments());

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {}({})",
            M::label(),
            columns.join(",")
        );

        let custom = M::custom_create_statements();
        if !custom.is_empty() {
            sql.push(';');
            sql.push_str(&custom);
        }

        sql
    }

    pub fn insert_statement() -> String {
        let mut builder = InsertColumnBuilder::default();
        M::accept(&mut builder);
        let (columns, placeholders) = builder.into_fragments();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            M::label(),
            columns.join(","),
            placeholders.join(",")
        )
    }

    pub fn update_statement() -> String {
        let mut builder = UpdateAssignmentBuilder::default();
        M::accept(&mut builder);

        format!(
            "UPDATE {} SET {} WHERE id=?",
            M::label(),
            builder.into_fragments().join(",")
        )
    }

    pub fn delete_all_statement() -> String {
        format!("DELETE FROM {}", M::label())
    }

    pub fn delete_by_id_statement() -> String {
        format!("DELETE FROM {} WHERE id=?", M::label())
    }

    pub fn select_all_statement() -> String {
        format!("SELECT * FROM {}", M::label())
    }

    pub fn select_by_id_statement() -> String {
        Self::select_by_field_statement("id")
    }

    /// `field` is interpolated as-is; callers must pass a known column name.
    pub fn select_by_field_statement(field: &str) -> String {
        format!("SELECT * FROM {} WHERE {}=?", M::label(), field)
    }

    pub fn table_schema() -> TableSchema {
        let mut columns = vec![ColumnSchema {
            name: "id".to_string(),
            column_type: "INTEGER".to_string(),
            sql_type: None,
            options: "PRIMARY KEY AUTOINCREMENT".to_string(),
        }];
        columns.extend(
            field_descriptors::<M>()
                .into_iter()
                .map(|field| ColumnSchema {
                    name: field.label.to_string(),
                    column_type: field.sql_type.column_type().to_string(),
                    sql_type: Some(field.sql_type),
                    options: field.options.to_string(),
                }),
        );

        let custom = M::custom_create_statements();
        TableSchema {
            table: M::label().to_string(),
            columns,
            custom_statements: (!custom.is_empty()).then_some(custom),
        }
    }
}
