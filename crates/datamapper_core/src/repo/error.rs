//! Repository error taxonomy.
//!
//! Cardinality violations are separate variants so callers can tell "no such
//! row" from "more rows than the contract allows" without parsing messages.

use crate::db::DbError;
use crate::mapping::MappingError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// What a failed lookup or mutation was addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(i64),
    /// SQL text of the statement that was executed.
    Query(String),
}

impl Display for LookupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Query(sql) => write!(f, "query `{sql}`"),
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Identity-based operation called with `id < 1`, or an unknown field.
    InvalidArgument(String),
    /// Mapping descriptor cannot produce valid SQL.
    Configuration(MappingError),
    /// Zero rows where exactly one was required.
    DoesNotExist {
        entity: &'static str,
        key: LookupKey,
    },
    /// A different row count than exactly one.
    ///
    /// `affected` is the reported count for mutations and `None` for queries
    /// that returned more than one row.
    NotOne {
        entity: &'static str,
        key: LookupKey,
        affected: Option<usize>,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Configuration(err) => write!(f, "invalid mapping: {err}"),
            Self::DoesNotExist { entity, key } => {
                write!(f, "{entity} does not exist for {key}")
            }
            Self::NotOne {
                entity,
                key,
                affected: Some(count),
            } => write!(f, "{count} {entity} rows affected for {key} instead of 1"),
            Self::NotOne {
                entity,
                key,
                affected: None,
            } => write!(f, "more than one {entity} row for {key}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Configuration(err) => Some(err),
            Self::InvalidArgument(_) => None,
            Self::DoesNotExist { .. } => None,
            Self::NotOne { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<MappingError> for RepoError {
    fn from(value: MappingError) -> Self {
        Self::Configuration(value)
    }
}
