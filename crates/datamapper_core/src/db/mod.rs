//! SQLite driver bootstrap, control statements and transaction scopes.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Execute DDL/control statements with logging.
//! - Provide scoped transactions with guaranteed rollback.
//!
//! # Invariants
//! - Returned connections honor the requested `ConnectOptions`.
//! - Transactions never nest on one connection.

use crate::logging::sql_excerpt;
use log::{debug, error};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod transaction;

pub use open::{connect, connect_in_memory, connect_in_memory_with, connect_with, ConnectOptions};
pub use transaction::{ScopeState, TransactionScope};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A transaction scope was requested while one is already active.
    NestedTransaction,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::NestedTransaction => {
                write!(f, "cannot begin a transaction while another one is active")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NestedTransaction => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Executes one or more `;`-separated DDL/control statements.
pub fn execute(conn: &Connection, sql: &str) -> DbResult<()> {
    match conn.execute_batch(sql) {
        Ok(()) => {
            debug!(
                "event=db_execute module=db status=ok sql={}",
                sql_excerpt(sql)
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=db_execute module=db status=error sql={} error={}",
                sql_excerpt(sql),
                err
            );
            Err(err.into())
        }
    }
}

/// Turns per-statement SQL tracing on or off for `conn`.
///
/// Traced statements are logged at debug level as `event=sql_trace`.
pub fn set_sql_tracing(conn: &mut Connection, enabled: bool) {
    if enabled {
        conn.trace(Some(trace_sql));
    } else {
        conn.trace(None);
    }
}

fn trace_sql(sql: &str) {
    debug!("event=sql_trace module=db sql={}", sql_excerpt(sql));
}
