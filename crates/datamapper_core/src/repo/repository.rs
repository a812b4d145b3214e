//! Generic CRUD repository over a mapping descriptor.
//!
//! # Responsibility
//! - Persist, load and delete entities of one mapping through cached
//!   prepared statements.
//! - Enforce the exactly-one-row contract of identity-based operations.
//!
//! # Invariants
//! - Bind order and read order always follow `Mapping::accept`.
//! - Mutations run inside a `TransactionScope` unless the caller disables it;
//!   reads never open a transaction.
//! - A failed mutation never leaves its own transaction open.
//! - `entity.id` is only assigned after the insert transaction committed.

use crate::db::{self, TransactionScope};
use crate::mapping::{field_descriptors, validate_mapping, Entity, Mapping, UNSET_ID};
use crate::repo::error::{LookupKey, RepoError, RepoResult};
use crate::repo::statement_cache::{StatementCache, StatementKind};
use crate::sql::visitors::{ObjectFieldBinder, StatementFieldBinder};
use crate::sql::StatementBuilder;
use log::{debug, info, warn};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row, Statement};
use std::marker::PhantomData;
use std::time::Instant;

/// CRUD facade for mapping `M` on one connection.
///
/// Owns the prepared statements it creates; they live as long as the
/// repository or until [`Repository::reset_statements`]. A repository is
/// bound to a single thread through its connection borrow.
pub struct Repository<'conn, M: Mapping> {
    conn: &'conn Connection,
    statements: StatementCache<'conn>,
    _mapping: PhantomData<fn() -> M>,
}

impl<'conn, M: Mapping> Repository<'conn, M> {
    /// Validates the mapping and binds a repository to `conn`.
    ///
    /// # Errors
    /// - `RepoError::Configuration` when the mapping cannot produce valid SQL.
    pub fn new(conn: &'conn Connection) -> RepoResult<Self> {
        validate_mapping::<M>()?;
        Ok(Self {
            conn,
            statements: StatementCache::new(M::label()),
            _mapping: PhantomData,
        })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Creates the mapped table and runs the mapping's custom DDL.
    pub fn create_table(&self, enable_transaction: bool) -> RepoResult<()> {
        let sql = StatementBuilder::<M>::create_table_statement();
        let mut transaction = TransactionScope::begin(self.conn, enable_transaction)?;
        db::execute(self.conn, &sql)?;
        transaction.commit()?;
        info!(
            "event=repo_create_table module=repo status=ok table={}",
            M::label()
        );
        Ok(())
    }

    /// Inserts a new entity or updates a persisted one.
    ///
    /// # Errors
    /// - `RepoError::NotOne` when the statement did not affect exactly one row.
    pub fn save(&mut self, entity: &mut M::Entity, enable_transaction: bool) -> RepoResult<()> {
        if entity.is_persisted() {
            self.update(entity, enable_transaction)
        } else {
            self.insert(entity, enable_transaction)
        }
    }

    /// Saves every entity under one transaction; nothing is committed unless
    /// all saves succeed.
    ///
    /// When this call owns the transaction and fails, ids assigned to new
    /// entities earlier in the batch are reset to `UNSET_ID`.
    pub fn save_all(
        &mut self,
        entities: &mut [M::Entity],
        enable_transaction: bool,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let mut transaction = TransactionScope::begin(self.conn, enable_transaction)?;
        let mut inserted = Vec::new();

        let result = self
            .save_each(entities, &mut inserted)
            .and_then(|()| transaction.commit().map_err(RepoError::from));

        if let Err(err) = result {
            drop(transaction);
            if enable_transaction {
                for index in inserted {
                    entities[index].set_id(UNSET_ID);
                }
            }
            warn!(
                "event=repo_save_batch module=repo status=error table={} count={} duration_ms={} error={}",
                M::label(),
                entities.len(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        info!(
            "event=repo_save_batch module=repo status=ok table={} count={} duration_ms={}",
            M::label(),
            entities.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Loads the entity with `id`.
    ///
    /// # Errors
    /// - `RepoError::InvalidArgument` when `id < 1`; the store is not touched.
    /// - `RepoError::DoesNotExist` when no row has `id`.
    pub fn get(&mut self, id: i64) -> RepoResult<M::Entity> {
        ensure_valid_id::<M>(id)?;
        let statement = self.statements.get_or_prepare(
            self.conn,
            StatementKind::SelectById,
            StatementBuilder::<M>::select_by_id_statement,
        )?;
        statement.raw_bind_parameter(1, id)?;
        // Ids are unique, so the extra-row check only guards against a
        // misbehaving store.
        fetch_one::<M>(statement, false, LookupKey::Id(id))
    }

    /// Loads the single entity whose `field` equals `value`.
    ///
    /// With `allow_many`, the first row is returned and extra rows are ignored.
    pub fn get_by_field<V: ToSql>(
        &self,
        field: &str,
        value: V,
        allow_many: bool,
    ) -> RepoResult<M::Entity> {
        let sql = select_by_field_sql::<M>(field)?;
        let mut statement = self.conn.prepare(&sql)?;
        statement.raw_bind_parameter(1, value)?;
        fetch_one::<M>(&mut statement, allow_many, LookupKey::Query(sql))
    }

    /// Runs a parameterless `SELECT *`-shaped query expecting one row.
    pub fn get_by_query(&self, sql: &str, allow_many: bool) -> RepoResult<M::Entity> {
        let mut statement = self.conn.prepare(sql)?;
        fetch_one::<M>(&mut statement, allow_many, LookupKey::Query(sql.to_string()))
    }

    /// Runs a caller-prepared, already-bound statement expecting one row.
    ///
    /// Error messages carry the expanded SQL, including bound values.
    pub fn get_by_statement(
        &self,
        statement: &mut Statement<'_>,
        allow_many: bool,
    ) -> RepoResult<M::Entity> {
        let key = LookupKey::Query(statement.expanded_sql().unwrap_or_default());
        fetch_one::<M>(statement, allow_many, key)
    }

    pub fn get_all(&mut self) -> RepoResult<Vec<M::Entity>> {
        let statement = self.statements.get_or_prepare(
            self.conn,
            StatementKind::SelectAll,
            StatementBuilder::<M>::select_all_statement,
        )?;
        fetch_many::<M>(statement)
    }

    pub fn get_many_by_field<V: ToSql>(
        &self,
        field: &str,
        value: V,
    ) -> RepoResult<Vec<M::Entity>> {
        let sql = select_by_field_sql::<M>(field)?;
        let mut statement = self.conn.prepare(&sql)?;
        statement.raw_bind_parameter(1, value)?;
        fetch_many::<M>(&mut statement)
    }

    pub fn get_many_by_query(&self, sql: &str) -> RepoResult<Vec<M::Entity>> {
        let mut statement = self.conn.prepare(sql)?;
        fetch_many::<M>(&mut statement)
    }

    pub fn get_many_by_statement(
        &self,
        statement: &mut Statement<'_>,
    ) -> RepoResult<Vec<M::Entity>> {
        fetch_many::<M>(statement)
    }

    /// Deletes the row with `id`.
    ///
    /// # Errors
    /// - `RepoError::InvalidArgument` when `id < 1`.
    /// - `RepoError::NotOne` when `check_one_deleted` and the delete did not
    ///   affect exactly one row.
    pub fn delete(
        &mut self,
        id: i64,
        enable_transaction: bool,
        check_one_deleted: bool,
    ) -> RepoResult<()> {
        ensure_valid_id::<M>(id)?;
        let conn = self.conn;
        let statement = self.statements.get_or_prepare(
            conn,
            StatementKind::DeleteById,
            StatementBuilder::<M>::delete_by_id_statement,
        )?;
        statement.raw_bind_parameter(1, id)?;

        let mut transaction = TransactionScope::begin(conn, enable_transaction)?;
        let affected = statement.raw_execute()?;
        if check_one_deleted {
            expect_one_affected::<M>(affected, LookupKey::Id(id))?;
        }
        transaction.commit()?;

        debug!(
            "event=repo_delete module=repo status=ok table={} id={} affected={}",
            M::label(),
            id,
            affected
        );
        Ok(())
    }

    /// Deletes a persisted entity and marks it as unsaved.
    pub fn delete_entity(
        &mut self,
        entity: &mut M::Entity,
        enable_transaction: bool,
        check_one_deleted: bool,
    ) -> RepoResult<()> {
        if !entity.is_persisted() {
            return Err(RepoError::InvalidArgument(format!(
                "cannot delete unsaved {} entity (id {})",
                M::label(),
                entity.id()
            )));
        }
        self.delete(entity.id(), enable_transaction, check_one_deleted)?;
        entity.set_id(UNSET_ID);
        Ok(())
    }

    /// Deletes every row of the mapped table; returns the number removed.
    pub fn delete_all(&mut self, enable_transaction: bool) -> RepoResult<usize> {
        let conn = self.conn;
        let statement = self.statements.get_or_prepare(
            conn,
            StatementKind::DeleteAll,
            StatementBuilder::<M>::delete_all_statement,
        )?;

        let mut transaction = TransactionScope::begin(conn, enable_transaction)?;
        let affected = statement.raw_execute()?;
        transaction.commit()?;

        debug!(
            "event=repo_delete_all module=repo status=ok table={} affected={}",
            M::label(),
            affected
        );
        Ok(affected)
    }

    /// Drops all cached statements; they are prepared again on next use.
    pub fn reset_statements(&mut self) {
        self.statements.reset();
    }

    pub fn prepared_statement_count(&self) -> usize {
        self.statements.prepared_count()
    }

    pub fn is_statement_prepared(&self, kind: StatementKind) -> bool {
        self.statements.is_prepared(kind)
    }

    fn insert(&mut self, entity: &mut M::Entity, enable_transaction: bool) -> RepoResult<()> {
        let conn = self.conn;
        let statement = self.statements.get_or_prepare(
            conn,
            StatementKind::Insert,
            StatementBuilder::<M>::insert_statement,
        )?;
        bind_fields::<M>(statement, entity)?;

        let mut transaction = TransactionScope::begin(conn, enable_transaction)?;
        let affected = statement.raw_execute()?;
        expect_one_affected::<M>(
            affected,
            LookupKey::Query(StatementBuilder::<M>::insert_statement()),
        )?;
        let id = conn.last_insert_rowid();
        transaction.commit()?;

        entity.set_id(id);
        debug!(
            "event=repo_save module=repo status=ok table={} mode=insert id={}",
            M::label(),
            id
        );
        Ok(())
    }

    fn update(&mut self, entity: &M::Entity, enable_transaction: bool) -> RepoResult<()> {
        let conn = self.conn;
        let id = entity.id();
        let statement = self.statements.get_or_prepare(
            conn,
            StatementKind::Update,
            StatementBuilder::<M>::update_statement,
        )?;
        let id_index = bind_fields::<M>(statement, entity)?;
        statement.raw_bind_parameter(id_index, id)?;

        let mut transaction = TransactionScope::begin(conn, enable_transaction)?;
        let affected = statement.raw_execute()?;
        expect_one_affected::<M>(affected, LookupKey::Id(id))?;
        transaction.commit()?;

        debug!(
            "event=repo_save module=repo status=ok table={} mode=update id={}",
            M::label(),
            id
        );
        Ok(())
    }

    fn save_each(
        &mut self,
        entities: &mut [M::Entity],
        inserted: &mut Vec<usize>,
    ) -> RepoResult<()> {
        for (index, entity) in entities.iter_mut().enumerate() {
            let is_new = !entity.is_persisted();
            self.save(entity, false)?;
            if is_new {
                inserted.push(index);
            }
        }
        Ok(())
    }
}

fn ensure_valid_id<M: Mapping>(id: i64) -> RepoResult<()> {
    if id < 1 {
        return Err(RepoError::InvalidArgument(format!(
            "{} id must be >= 1, got {id}",
            M::label()
        )));
    }
    Ok(())
}

fn expect_one_affected<M: Mapping>(affected: usize, key: LookupKey) -> RepoResult<()> {
    if affected != 1 {
        return Err(RepoError::NotOne {
            entity: M::label(),
            key,
            affected: Some(affected),
        });
    }
    Ok(())
}

fn select_by_field_sql<M: Mapping>(field: &str) -> RepoResult<String> {
    let known = field.eq_ignore_ascii_case("id")
        || field_descriptors::<M>()
            .iter()
            .any(|descriptor| descriptor.label.eq_ignore_ascii_case(field));
    if !known {
        return Err(RepoError::InvalidArgument(format!(
            "`{field}` is not a mapped field of {}",
            M::label()
        )));
    }
    Ok(StatementBuilder::<M>::select_by_field_statement(field))
}

/// Binds entity fields from parameter 1; returns the next free index.
fn bind_fields<M: Mapping>(
    statement: &mut Statement<'_>,
    entity: &M::Entity,
) -> rusqlite::Result<usize> {
    let mut binder = StatementFieldBinder::new(statement, entity);
    M::accept(&mut binder);
    binder.finish()
}

fn read_entity<M: Mapping>(row: &Row<'_>) -> rusqlite::Result<M::Entity> {
    let mut entity = M::Entity::default();
    entity.set_id(row.get(0)?);
    let mut binder = ObjectFieldBinder::new(row, &mut entity);
    M::accept(&mut binder);
    binder.finish()?;
    Ok(entity)
}

fn fetch_one<M: Mapping>(
    statement: &mut Statement<'_>,
    allow_many: bool,
    key: LookupKey,
) -> RepoResult<M::Entity> {
    let mut rows = statement.raw_query();
    let entity = match rows.next()? {
        Some(row) => read_entity::<M>(row)?,
        None => {
            return Err(RepoError::DoesNotExist {
                entity: M::label(),
                key,
            })
        }
    };

    if !allow_many && rows.next()?.is_some() {
        return Err(RepoError::NotOne {
            entity: M::label(),
            key,
            affected: None,
        });
    }

    Ok(entity)
}

fn fetch_many<M: Mapping>(statement: &mut Statement<'_>) -> RepoResult<Vec<M::Entity>> {
    let mut rows = statement.raw_query();
    let mut entities = Vec::new();
    while let Some(row) = rows.next()? {
        entities.push(read_entity::<M>(row)?);
    }
    Ok(entities)
}
