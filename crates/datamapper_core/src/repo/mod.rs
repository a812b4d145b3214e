//! Generic repository over mapping descriptors.
//!
//! # Responsibility
//! - Provide CRUD for any `Mapping` without per-entity SQL.
//! - Own prepared statements per repository instance.
//!
//! # Invariants
//! - Identity-based operations reject `id < 1` with `InvalidArgument`.
//! - Cardinality violations surface as `DoesNotExist` or `NotOne`, never as
//!   transport errors.

pub mod error;
pub mod repository;
pub mod statement_cache;

pub use error::{LookupKey, RepoError, RepoResult};
pub use repository::Repository;
pub use statement_cache::StatementKind;
