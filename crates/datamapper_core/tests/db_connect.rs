mod common;

use common::{row_count, table_exists, Person, PersonMapping};
use datamapper_core::db::{self, connect, connect_in_memory_with, connect_with};
use datamapper_core::{ConnectOptions, DbError, Repository, TransactionScope};
use std::time::Duration;

fn foreign_keys_enabled(conn: &datamapper_core::rusqlite::Connection) -> bool {
    let value: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    value == 1
}

#[test]
fn file_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.sqlite3");

    {
        let conn = connect(&path).unwrap();
        let mut repo = Repository::<PersonMapping>::new(&conn).unwrap();
        repo.create_table(true).unwrap();
        let mut quinn = Person::new("quinn", 39);
        repo.save(&mut quinn, true).unwrap();
    }

    let conn = connect(&path).unwrap();
    assert!(table_exists(&conn, "person"));
    let mut repo = Repository::<PersonMapping>::new(&conn).unwrap();
    let stored = repo.get_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "quinn");
}

#[test]
fn connect_options_control_foreign_keys() {
    let conn = connect_in_memory_with(&ConnectOptions::default()).unwrap();
    assert!(foreign_keys_enabled(&conn));

    let options = ConnectOptions {
        foreign_keys: false,
        busy_timeout: Duration::from_millis(250),
        ..ConnectOptions::default()
    };
    let conn = connect_in_memory_with(&options).unwrap();
    assert!(!foreign_keys_enabled(&conn));
}

#[test]
fn foreign_keys_are_enforced_for_custom_ddl() {
    let conn = connect_in_memory_with(&ConnectOptions::default()).unwrap();
    db::execute(
        &conn,
        "CREATE TABLE parent(id INTEGER PRIMARY KEY);
         CREATE TABLE child(id INTEGER PRIMARY KEY, parent_id INT REFERENCES parent(id));",
    )
    .unwrap();

    let err = db::execute(&conn, "INSERT INTO child (parent_id) VALUES (7);").unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
    assert_eq!(row_count(&conn, "child"), 0);
}

#[test]
fn sql_tracing_does_not_change_results() {
    let options = ConnectOptions {
        trace_sql: true,
        ..ConnectOptions::default()
    };
    let mut conn = connect_in_memory_with(&options).unwrap();
    {
        let mut repo = Repository::<PersonMapping>::new(&conn).unwrap();
        repo.create_table(true).unwrap();
        let mut rae = Person::new("rae", 26);
        repo.save(&mut rae, true).unwrap();
        assert_eq!(repo.get(rae.id).unwrap(), rae);
    }

    db::set_sql_tracing(&mut conn, false);
    assert_eq!(row_count(&conn, "person"), 1);
}

#[test]
fn execute_reports_invalid_sql() {
    let dir = tempfile::tempdir().unwrap();
    let conn = connect_with(dir.path().join("bad.sqlite3"), &ConnectOptions::default()).unwrap();

    let err = db::execute(&conn, "CREATE TABLE (").unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
    assert!(conn.is_autocommit());
}

#[test]
fn connect_fails_for_unreachable_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("db.sqlite3");
    assert!(matches!(connect(&path), Err(DbError::Sqlite(_))));
}

#[test]
fn caller_scope_wraps_several_repository_calls() {
    let conn = connect_in_memory_with(&ConnectOptions::default()).unwrap();
    let mut repo = Repository::<PersonMapping>::new(&conn).unwrap();
    repo.create_table(true).unwrap();

    {
        let _scope = TransactionScope::begin(&conn, true).unwrap();
        let mut sam = Person::new("sam", 50);
        repo.save(&mut sam, false).unwrap();
        let mut tia = Person::new("tia", 51);
        repo.save(&mut tia, false).unwrap();
        assert_eq!(row_count(&conn, "person"), 2);
    }
    assert_eq!(row_count(&conn, "person"), 0);

    let mut scope = TransactionScope::begin(&conn, true).unwrap();
    let mut uma = Person::new("uma", 52);
    repo.save(&mut uma, false).unwrap();
    scope.commit().unwrap();
    assert_eq!(row_count(&conn, "person"), 1);
}
