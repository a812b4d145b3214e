//! Registration-time checks for mapping descriptors.
//!
//! Labels are interpolated into SQL text, so anything that is not a plain
//! identifier is rejected before a repository is built over the mapping.

use super::{Field, FieldDescriptor, FieldType, FieldVisitor, Mapping};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Configuration error in a mapping descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// Table label is not a plain SQL identifier.
    InvalidTableLabel(String),
    /// Field label is not a plain SQL identifier.
    InvalidFieldLabel { table: String, field: String },
    /// Mapping declares no fields besides the surrogate key.
    NoFields(String),
    /// A field reuses the reserved surrogate key name.
    ReservedField { table: String, field: String },
    DuplicateField { table: String, field: String },
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTableLabel(label) => {
                write!(f, "table label `{label}` is not a valid identifier")
            }
            Self::InvalidFieldLabel { table, field } => write!(
                f,
                "field label `{field}` in mapping `{table}` is not a valid identifier"
            ),
            Self::NoFields(table) => write!(f, "mapping `{table}` declares no fields"),
            Self::ReservedField { table, field } => write!(
                f,
                "mapping `{table}` declares reserved field `{field}`; `id` is the surrogate key"
            ),
            Self::DuplicateField { table, field } => {
                write!(f, "mapping `{table}` declares field `{field}` more than once")
            }
        }
    }
}

impl Error for MappingError {}

struct DescriptorCollector {
    fields: Vec<FieldDescriptor>,
}

impl<E> FieldVisitor<E> for DescriptorCollector {
    fn visit_field<T: FieldType>(&mut self, field: &Field<E, T>) {
        self.fields.push(field.descriptor());
    }
}

/// Returns the mapped fields of `M` in declared order, excluding `id`.
pub fn field_descriptors<M: Mapping>() -> Vec<FieldDescriptor> {
    let mut collector = DescriptorCollector { fields: Vec::new() };
    M::accept(&mut collector);
    collector.fields
}

/// Checks that `M` can be turned into well-formed SQL.
pub fn validate_mapping<M: Mapping>() -> Result<(), MappingError> {
    let table = M::label();
    if !is_identifier(table) {
        return Err(MappingError::InvalidTableLabel(table.to_string()));
    }

    let fields = field_descriptors::<M>();
    if fields.is_empty() {
        return Err(MappingError::NoFields(table.to_string()));
    }

    let mut seen = BTreeSet::new();
    for field in &fields {
        if !is_identifier(field.label) {
            return Err(MappingError::InvalidFieldLabel {
                table: table.to_string(),
                field: field.label.to_string(),
            });
        }
        if field.label.eq_ignore_ascii_case("id") {
            return Err(MappingError::ReservedField {
                table: table.to_string(),
                field: field.label.to_string(),
            });
        }
        // SQLite column names are case-insensitive.
        if !seen.insert(field.label.to_ascii_lowercase()) {
            return Err(MappingError::DuplicateField {
                table: table.to_string(),
                field: field.label.to_string(),
            });
        }
    }

    Ok(())
}

pub(crate) fn is_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value)
}
