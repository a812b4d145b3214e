//! Column descriptors and semantic type mapping.
//!
//! # Responsibility
//! - Describe one mapped column: label, column options and semantic type.
//! - Map semantic types to SQLite column type text.
//! - Carry typed accessors that move values between entity and statement.
//!
//! # Invariants
//! - Only types implementing `FieldType` can be mapped, so an unmapped
//!   semantic type is rejected at compile time.
//! - `type_definition()` is `<TYPE>` or `<TYPE> <options>`, never with a
//!   trailing space.

use rusqlite::types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Semantic column type understood by the statement builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Integer,
    /// Stored as `0`/`1` in an `INT` column.
    Boolean,
    Real,
    Text,
}

impl SqlType {
    /// Returns the column type text used in `CREATE TABLE`.
    pub fn column_type(self) -> &'static str {
        match self {
            Self::Integer => "INT",
            Self::Boolean => "INT",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_type())
    }
}

/// Rust value types that can back a mapped column.
///
/// Implemented for `i32`, `i64`, `bool`, `f64` and `String`. A mapping that
/// declares a field of any other type does not compile.
pub trait FieldType: ToSql + FromSql {
    const SQL_TYPE: SqlType;
}

impl FieldType for i32 {
    const SQL_TYPE: SqlType = SqlType::Integer;
}

impl FieldType for i64 {
    const SQL_TYPE: SqlType = SqlType::Integer;
}

impl FieldType for bool {
    const SQL_TYPE: SqlType = SqlType::Boolean;
}

impl FieldType for f64 {
    const SQL_TYPE: SqlType = SqlType::Real;
}

impl FieldType for String {
    const SQL_TYPE: SqlType = SqlType::Text;
}

/// Untyped description of one mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub label: &'static str,
    /// Extra column constraints such as `UNIQUE NOT NULL`. May be empty.
    pub options: &'static str,
    pub sql_type: SqlType,
}

impl FieldDescriptor {
    /// Column type plus options, e.g. `TEXT UNIQUE NOT NULL`.
    pub fn type_definition(&self) -> String {
        if self.options.is_empty() {
            self.sql_type.column_type().to_string()
        } else {
            format!("{} {}", self.sql_type.column_type(), self.options)
        }
    }
}

/// Typed field of entity `E` holding a value of type `T`.
///
/// Built inside `Mapping::accept` and handed to each visitor in turn.
pub struct Field<E, T> {
    label: &'static str,
    options: &'static str,
    get: fn(&E) -> &T,
    get_mut: fn(&mut E) -> &mut T,
}

impl<E, T: FieldType> Field<E, T> {
    pub fn new(label: &'static str, get: fn(&E) -> &T, get_mut: fn(&mut E) -> &mut T) -> Self {
        Self {
            label,
            options: "",
            get,
            get_mut,
        }
    }

    /// Attaches column options (constraints) to the declaration.
    pub fn with_options(mut self, options: &'static str) -> Self {
        self.options = options;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            label: self.label,
            options: self.options,
            sql_type: T::SQL_TYPE,
        }
    }

    /// Reads the current field value from `entity`.
    pub fn value<'e>(&self, entity: &'e E) -> &'e T {
        (self.get)(entity)
    }

    /// Returns mutable access to the field storage in `entity`.
    pub fn value_mut<'e>(&self, entity: &'e mut E) -> &'e mut T {
        (self.get_mut)(entity)
    }
}
