mod common;

use common::{GadgetMapping, IndexedPersonMapping, PersonMapping};
use datamapper_core::sql::ColumnSchema;
use datamapper_core::{SqlType, StatementBuilder};

type PersonSql = StatementBuilder<PersonMapping>;
type GadgetSql = StatementBuilder<GadgetMapping>;

#[test]
fn person_statements_match_canonical_text() {
    assert_eq!(
        PersonSql::create_table_statement(),
        "CREATE TABLE IF NOT EXISTS person(id INTEGER PRIMARY KEY AUTOINCREMENT,name TEXT UNIQUE NOT NULL,age INT)"
    );
    assert_eq!(
        PersonSql::insert_statement(),
        "INSERT INTO person (name,age) VALUES (?,?)"
    );
    assert_eq!(
        PersonSql::update_statement(),
        "UPDATE person SET name=?,age=? WHERE id=?"
    );
    assert_eq!(
        PersonSql::select_by_field_statement("age"),
        "SELECT * FROM person WHERE age=?"
    );
    assert_eq!(
        PersonSql::select_by_id_statement(),
        "SELECT * FROM person WHERE id=?"
    );
    assert_eq!(PersonSql::select_all_statement(), "SELECT * FROM person");
    assert_eq!(PersonSql::delete_all_statement(), "DELETE FROM person");
    assert_eq!(
        PersonSql::delete_by_id_statement(),
        "DELETE FROM person WHERE id=?"
    );
}

#[test]
fn custom_ddl_is_appended_verbatim_after_semicolon() {
    assert_eq!(
        StatementBuilder::<IndexedPersonMapping>::create_table_statement(),
        "CREATE TABLE IF NOT EXISTS person_indexed(id INTEGER PRIMARY KEY AUTOINCREMENT,\
         name TEXT UNIQUE NOT NULL,age INT);\
         CREATE INDEX IF NOT EXISTS person_indexed_age_idx ON person_indexed (age)"
    );
}

#[test]
fn create_table_declares_id_plus_every_field_without_trailing_comma() {
    let sql = GadgetSql::create_table_statement();
    let body = sql
        .strip_prefix("CREATE TABLE IF NOT EXISTS gadget(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap();

    let columns: Vec<_> = body.split(',').collect();
    assert_eq!(columns.len(), 4 + 1);
    assert_eq!(columns[0], "id INTEGER PRIMARY KEY AUTOINCREMENT");
    assert_eq!(
        &columns[1..],
        &[
            "label TEXT",
            "serial INT",
            "weight REAL",
            "in_stock INT NOT NULL DEFAULT 0"
        ]
    );
    assert!(!sql.contains(",)"));
}

#[test]
fn insert_column_and_placeholder_lists_have_field_count_length() {
    let sql = GadgetSql::insert_statement();
    let (columns, placeholders) = sql
        .strip_prefix("INSERT INTO gadget (")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|rest| rest.split_once(") VALUES ("))
        .unwrap();

    assert_eq!(columns.split(',').count(), 4);
    assert_eq!(placeholders.split(',').count(), 4);
    assert!(placeholders.split(',').all(|placeholder| placeholder == "?"));
}

#[test]
fn update_assigns_every_field_then_filters_by_id() {
    let sql = GadgetSql::update_statement();
    let assignments = sql
        .strip_prefix("UPDATE gadget SET ")
        .and_then(|rest| rest.strip_suffix(" WHERE id=?"))
        .unwrap();

    let assignments: Vec<_> = assignments.split(',').collect();
    assert_eq!(
        assignments,
        vec!["label=?", "serial=?", "weight=?", "in_stock=?"]
    );
}

#[test]
fn table_schema_lists_id_first_then_declared_fields() {
    let schema = StatementBuilder::<IndexedPersonMapping>::table_schema();
    assert_eq!(schema.table, "person_indexed");
    assert_eq!(
        schema.columns,
        vec![
            ColumnSchema {
                name: "id".to_string(),
                column_type: "INTEGER".to_string(),
                sql_type: None,
                options: "PRIMARY KEY AUTOINCREMENT".to_string(),
            },
            ColumnSchema {
                name: "name".to_string(),
                column_type: "TEXT".to_string(),
                sql_type: Some(SqlType::Text),
                options: "UNIQUE NOT NULL".to_string(),
            },
            ColumnSchema {
                name: "age".to_string(),
                column_type: "INT".to_string(),
                sql_type: Some(SqlType::Integer),
                options: String::new(),
            },
        ]
    );
    assert!(schema
        .custom_statements
        .as_deref()
        .unwrap()
        .starts_with("CREATE INDEX"));
    assert!(StatementBuilder::<PersonMapping>::table_schema()
        .custom_statements
        .is_none());
}

#[test]
fn table_schema_serializes_with_snake_case_types() {
    let json = serde_json::to_value(GadgetSql::table_schema()).unwrap();
    assert_eq!(json["table"], "gadget");
    assert_eq!(json["columns"][0]["sql_type"], serde_json::Value::Null);
    assert_eq!(json["columns"][4]["name"], "in_stock");
    assert_eq!(json["columns"][4]["sql_type"], "boolean");
    assert_eq!(json["columns"][4]["column_type"], "INT");
}
