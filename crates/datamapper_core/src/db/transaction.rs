//! Scoped transaction control.
//!
//! # Responsibility
//! - Issue `BEGIN`/`COMMIT`/`ROLLBACK TRANSACTION` around a unit of work.
//! - Roll back automatically when a scope is left without commit.
//!
//! # Invariants
//! - `Committed` and `RolledBack` are terminal; later `commit()`/`rollback()`
//!   calls are no-ops.
//! - A `Disabled` scope never touches the connection.
//! - A scope still `Open` at drop issues exactly one rollback.

use super::{DbError, DbResult};
use log::{debug, error, warn};
use rusqlite::Connection;

pub const BEGIN_TRANSACTION_SQL: &str = "BEGIN TRANSACTION";
pub const COMMIT_TRANSACTION_SQL: &str = "COMMIT TRANSACTION";
pub const ROLLBACK_TRANSACTION_SQL: &str = "ROLLBACK TRANSACTION";

/// Lifecycle state of a `TransactionScope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Open,
    Committed,
    RolledBack,
    /// No-op scope used when an outer scope owns the transaction.
    Disabled,
}

/// Transaction guard bound to one connection.
///
/// Early returns (including `?`) leave the scope open, so `Drop` rolls back.
#[derive(Debug)]
pub struct TransactionScope<'conn> {
    conn: &'conn Connection,
    state: ScopeState,
}

impl<'conn> TransactionScope<'conn> {
    /// Opens a transaction when `enabled`, otherwise returns a disabled scope.
    ///
    /// # Errors
    /// - `DbError::NestedTransaction` when `conn` is already inside a
    ///   transaction.
    /// - `DbError::Sqlite` when `BEGIN TRANSACTION` fails.
    pub fn begin(conn: &'conn Connection, enabled: bool) -> DbResult<Self> {
        if !enabled {
            return Ok(Self::disabled(conn));
        }
        if !conn.is_autocommit() {
            return Err(DbError::NestedTransaction);
        }

        conn.execute_batch(BEGIN_TRANSACTION_SQL)?;
        debug!("event=tx_begin module=db status=ok");
        Ok(Self {
            conn,
            state: ScopeState::Open,
        })
    }

    pub fn disabled(conn: &'conn Connection) -> Self {
        Self {
            conn,
            state: ScopeState::Disabled,
        }
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ScopeState::Open
    }

    /// Commits an open scope. A failed commit leaves the scope open so that
    /// drop still rolls back.
    pub fn commit(&mut self) -> DbResult<()> {
        if !self.is_open() {
            return Ok(());
        }
        self.conn.execute_batch(COMMIT_TRANSACTION_SQL)?;
        self.state = ScopeState::Committed;
        debug!("event=tx_commit module=db status=ok");
        Ok(())
    }

    pub fn rollback(&mut self) -> DbResult<()> {
        if !self.is_open() {
            return Ok(());
        }
        self.conn.execute_batch(ROLLBACK_TRANSACTION_SQL)?;
        self.state = ScopeState::RolledBack;
        debug!("event=tx_rollback module=db status=ok");
        Ok(())
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if !self.is_open() {
            return;
        }
        // SQLite may already have rolled back on its own (e.g. after a
        // constraint failure with ON CONFLICT ROLLBACK).
        if self.conn.is_autocommit() {
            self.state = ScopeState::RolledBack;
            return;
        }
        match self.conn.execute_batch(ROLLBACK_TRANSACTION_SQL) {
            Ok(()) => {
                self.state = ScopeState::RolledBack;
                warn!("event=tx_auto_rollback module=db status=ok");
            }
            Err(err) => {
                error!("event=tx_auto_rollback module=db status=error error={err}");
            }
        }
    }
}
