//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply connection pragmas and tracing from `ConnectOptions`.
//!
//! # Invariants
//! - Bootstrap failures are logged with `duration_ms` and returned, never
//!   panicked on.

use super::{set_sql_tracing, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings applied right after opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Enables `PRAGMA foreign_keys`.
    pub foreign_keys: bool,
    pub busy_timeout: Duration,
    /// Logs every executed statement at debug level.
    pub trace_sql: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            foreign_keys: true,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            trace_sql: false,
        }
    }
}

/// Opens (or creates) the SQLite store at `path` with default options.
pub fn connect(path: impl AsRef<Path>) -> DbResult<Connection> {
    connect_with(path, &ConnectOptions::default())
}

/// Opens a private in-memory store with default options.
pub fn connect_in_memory() -> DbResult<Connection> {
    connect_in_memory_with(&ConnectOptions::default())
}

/// Opens (or creates) the SQLite store at `path`.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn connect_with(path: impl AsRef<Path>, options: &ConnectOptions) -> DbResult<Connection> {
    open_logged("file", options, || Connection::open(path))
}

/// Opens a private in-memory store.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn connect_in_memory_with(options: &ConnectOptions) -> DbResult<Connection> {
    open_logged("memory", options, Connection::open_in_memory)
}

fn open_logged(
    mode: &str,
    options: &ConnectOptions,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match configure_connection(&mut conn, options) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={} trace_sql={}",
                mode,
                started_at.elapsed().as_millis(),
                options.trace_sql
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_configure_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err.into())
        }
    }
}

fn configure_connection(conn: &mut Connection, options: &ConnectOptions) -> rusqlite::Result<()> {
    let foreign_keys = if options.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(options.busy_timeout)?;
    set_sql_tracing(conn, options.trace_sql);
    Ok(())
}
