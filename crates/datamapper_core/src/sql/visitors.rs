//! Field visitors for statement fragments and value binding.
//!
//! # Responsibility
//! - Accumulate one SQL fragment per mapped field (declaration, insert
//!   columns/placeholders, update assignments).
//! - Move field values between entities and prepared statements/result rows.
//!
//! # Invariants
//! - Every visitor sees fields in `Mapping::accept` order, so fragment order,
//!   bind-parameter order and result-column order always agree.
//! - Bind parameters are 1-based; result column 0 is reserved for `id`.
//! - Binders stop at the first driver error and report it from `finish()`.

use crate::mapping::{Field, FieldType, FieldVisitor};
use rusqlite::{Row, Statement};

/// Collects `<label> <type> <options>` declarations.
#[derive(Debug, Default)]
pub struct FieldDeclarationBuilder {
    declarations: Vec<String>,
}

impl FieldDeclarationBuilder {
    pub fn into_fragments(self) -> Vec<String> {
        self.declarations
    }
}

impl<E> FieldVisitor<E> for FieldDeclarationBuilder {
    fn visit_field<T: FieldType>(&mut self, field: &Field<E, T>) {
        let descriptor = field.descriptor();
        self.declarations.push(format!(
            "{} {}",
            descriptor.label,
            descriptor.type_definition()
        ));
    }
}

/// Collects insert column labels and their `?` placeholders side by side.
#[derive(Debug, Default)]
pub struct InsertColumnBuilder {
    columns: Vec<&'static str>,
    placeholders: Vec<&'static str>,
}

impl InsertColumnBuilder {
    /// Returns `(columns, placeholders)`; both lists have the same length.
    pub fn into_fragments(self) -> (Vec<&'static str>, Vec<&'static str>) {
        (self.columns, self.placeholders)
    }
}

impl<E> FieldVisitor<E> for InsertColumnBuilder {
    fn visit_field<T: FieldType>(&mut self, field: &Field<E, T>) {
        self.columns.push(field.label());
        self.placeholders.push("?");
    }
}

/// Collects `<label>=?` assignments for `UPDATE ... SET`.
#[derive(Debug, Default)]
pub struct UpdateAssignmentBuilder {
    assignments: Vec<String>,
}

impl UpdateAssignmentBuilder {
    pub fn into_fragments(self) -> Vec<String> {
        self.assignments
    }
}

impl<E> FieldVisitor<E> for UpdateAssignmentBuilder {
    fn visit_field<T: FieldType>(&mut self, field: &Field<E, T>) {
        self.assignments.push(format!("{}=?", field.label()));
    }
}

/// Write-binder: binds each field value as the next positional parameter.
pub struct StatementFieldBinder<'a, 'conn, E> {
    statement: &'a mut Statement<'conn>,
    entity: &'a E,
    next_index: usize,
    error: Option<rusqlite::Error>,
}

impl<'a, 'conn, E> StatementFieldBinder<'a, 'conn, E> {
    pub fn new(statement: &'a mut Statement<'conn>, entity: &'a E) -> Self {
        Self {
            statement,
            entity,
            next_index: 1,
            error: None,
        }
    }

    /// Returns the next free parameter index, or the first bind error.
    pub fn finish(self) -> rusqlite::Result<usize> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.next_index),
        }
    }
}

impl<E> FieldVisitor<E> for StatementFieldBinder<'_, '_, E> {
    fn visit_field<T: FieldType>(&mut self, field: &Field<E, T>) {
        if self.error.is_some() {
            return;
        }
        let value = field.value(self.entity);
        if let Err(err) = self.statement.raw_bind_parameter(self.next_index, value) {
            self.error = Some(err);
            return;
        }
        self.next_index += 1;
    }
}

/// Read-binder: fills entity fields from consecutive result columns.
pub struct ObjectFieldBinder<'a, 'row, E> {
    row: &'a Row<'row>,
    entity: &'a mut E,
    next_column: usize,
    error: Option<rusqlite::Error>,
}

impl<'a, 'row, E> ObjectFieldBinder<'a, 'row, E> {
    /// Starts reading at column 1; column 0 holds `id`.
    pub fn new(row: &'a Row<'row>, entity: &'a mut E) -> Self {
        Self {
            row,
            entity,
            next_column: 1,
            error: None,
        }
    }

    pub fn finish(self) -> rusqlite::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<E> FieldVisitor<E> for ObjectFieldBinder<'_, '_, E> {
    fn visit_field<T: FieldType>(&mut self, field: &Field<E, T>) {
        if self.error.is_some() {
            return;
        }
        match self.row.get::<_, T>(self.next_column) {
            Ok(value) => *field.value_mut(self.entity) = value,
            Err(err) => {
                self.error = Some(err);
                return;
            }
        }
        self.next_column += 1;
    }
}
