//! Per-repository prepared-statement cache.
//!
//! # Invariants
//! - One slot per `StatementKind`; a slot is prepared on first use and reused
//!   until `reset()`.
//! - A reused statement has its previous bindings cleared before it is handed
//!   out.

use crate::logging::sql_excerpt;
use log::debug;
use rusqlite::{Connection, Statement};

/// Operation kinds with a cached statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    SelectById,
    SelectAll,
    DeleteById,
    DeleteAll,
}

impl StatementKind {
    pub const ALL: [Self; 6] = [
        Self::Insert,
        Self::Update,
        Self::SelectById,
        Self::SelectAll,
        Self::DeleteById,
        Self::DeleteAll,
    ];

    fn slot(self) -> usize {
        match self {
            Self::Insert => 0,
            Self::Update => 1,
            Self::SelectById => 2,
            Self::SelectAll => 3,
            Self::DeleteById => 4,
            Self::DeleteAll => 5,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::SelectById => "select_by_id",
            Self::SelectAll => "select_all",
            Self::DeleteById => "delete_by_id",
            Self::DeleteAll => "delete_all",
        }
    }
}

pub struct StatementCache<'conn> {
    table: &'static str,
    slots: [Option<Statement<'conn>>; 6],
}

impl<'conn> StatementCache<'conn> {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            slots: Default::default(),
        }
    }

    /// Returns the cached statement for `kind`, preparing `sql()` on a miss.
    pub fn get_or_prepare(
        &mut self,
        conn: &'conn Connection,
        kind: StatementKind,
        sql: impl FnOnce() -> String,
    ) -> rusqlite::Result<&mut Statement<'conn>> {
        let slot = &mut self.slots[kind.slot()];
        let statement = match slot.take() {
            Some(mut statement) => {
                statement.clear_bindings();
                statement
            }
            None => {
                let sql = sql();
                debug!(
                    "event=stmt_prepare module=repo status=ok table={} kind={} sql={}",
                    self.table,
                    kind.as_str(),
                    sql_excerpt(&sql)
                );
                conn.prepare(&sql)?
            }
        };
        Ok(slot.insert(statement))
    }

    pub fn is_prepared(&self, kind: StatementKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn prepared_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Finalizes every cached statement.
    pub fn reset(&mut self) {
        let dropped = self.prepared_count();
        for slot in &mut self.slots {
            *slot = None;
        }
        debug!(
            "event=stmt_reset module=repo status=ok table={} dropped={}",
            self.table, dropped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{StatementCache, StatementKind};
    use rusqlite::Connection;

    #[test]
    fn slots_are_prepared_once_and_reused() {
        let conn = Connection::open_in_memory().unwrap();
        let mut cache = StatementCache::new("t");
        let mut builds = 0;

        for value in [1_i64, 2] {
            let statement = cache
                .get_or_prepare(&conn, StatementKind::SelectById, || {
                    builds += 1;
                    "SELECT ?".to_string()
                })
                .unwrap();
            statement.raw_bind_parameter(1, value).unwrap();
            let mut rows = statement.raw_query();
            let row = rows.next().unwrap().unwrap();
            assert_eq!(row.get::<_, i64>(0).unwrap(), value);
        }

        assert_eq!(builds, 1);
        assert!(cache.is_prepared(StatementKind::SelectById));
        assert!(!cache.is_prepared(StatementKind::Insert));
        assert_eq!(cache.prepared_count(), 1);
    }

    #[test]
    fn reused_statement_starts_with_cleared_bindings() {
        let conn = Connection::open_in_memory().unwrap();
        let mut cache = StatementCache::new("t");

        let statement = cache
            .get_or_prepare(&conn, StatementKind::SelectAll, || "SELECT ?".to_string())
            .unwrap();
        statement.raw_bind_parameter(1, 5_i64).unwrap();
        {
            let mut rows = statement.raw_query();
            let row = rows.next().unwrap().unwrap();
            assert_eq!(row.get::<_, i64>(0).unwrap(), 5);
        }

        let statement = cache
            .get_or_prepare(&conn, StatementKind::SelectAll, || unreachable!())
            .unwrap();
        let mut rows = statement.raw_query();
        let row = rows.next().unwrap().unwrap();
        assert_eq!(row.get::<_, Option<i64>>(0).unwrap(), None);
    }

    #[test]
    fn reset_drops_every_slot() {
        let conn = Connection::open_in_memory().unwrap();
        let mut cache = StatementCache::new("t");
        for kind in StatementKind::ALL {
            cache
                .get_or_prepare(&conn, kind, || "SELECT 1".to_string())
                .unwrap();
        }
        assert_eq!(cache.prepared_count(), StatementKind::ALL.len());

        cache.reset();
        assert_eq!(cache.prepared_count(), 0);
    }
}
