//! Entity and mapping-descriptor contracts.
//!
//! # Responsibility
//! - Define what a persistable entity must expose (`Entity`).
//! - Define the static, per-entity mapping descriptor (`Mapping`).
//! - Define the visitor seam every statement fragment and binder goes through.
//!
//! # Invariants
//! - `Mapping::accept` visits fields in one fixed declared order on every call.
//! - Column 0 of every mapped table is the surrogate key `id`.
//! - `id < 1` means the entity has not been persisted yet.

pub mod field;
mod validate;

pub use field::{Field, FieldDescriptor, FieldType, SqlType};
pub use validate::{field_descriptors, validate_mapping, MappingError};

/// Sentinel id of an entity that has not been persisted yet.
pub const UNSET_ID: i64 = -1;

/// Record with an integer surrogate key.
///
/// `Default` is used to materialize entities before the read-binder fills
/// their fields from a result row.
pub trait Entity: Default {
    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    fn is_persisted(&self) -> bool {
        self.id() >= 1
    }
}

/// Callback invoked once per mapped field, in declared order.
pub trait FieldVisitor<E> {
    fn visit_field<T: FieldType>(&mut self, field: &Field<E, T>);
}

/// Static mapping descriptor for one entity type.
///
/// Implementors are usually zero-sized marker types:
///
/// ```
/// use datamapper_core::mapping::{Entity, Field, FieldVisitor, Mapping};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     id: i64,
///     name: String,
///     age: i32,
/// }
///
/// impl Entity for Person {
///     fn id(&self) -> i64 {
///         self.id
///     }
///     fn set_id(&mut self, id: i64) {
///         self.id = id;
///     }
/// }
///
/// struct PersonMapping;
///
/// impl Mapping for PersonMapping {
///     type Entity = Person;
///
///     fn label() -> &'static str {
///         "person"
///     }
///
///     fn accept<V: FieldVisitor<Person>>(visitor: &mut V) {
///         visitor.visit_field(
///             &Field::new("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name)
///                 .with_options("UNIQUE NOT NULL"),
///         );
///         visitor.visit_field(&Field::new("age", |p: &Person| &p.age, |p: &mut Person| &mut p.age));
///     }
/// }
/// ```
pub trait Mapping {
    type Entity: Entity;

    /// Table name. Must be a plain SQL identifier.
    fn label() -> &'static str;

    /// Visits every mapped field except `id`, always in the same order.
    fn accept<V: FieldVisitor<Self::Entity>>(visitor: &mut V);

    /// Extra DDL appended after `CREATE TABLE`, without a leading semicolon.
    fn custom_create_statements() -> String {
        String::new()
    }
}
