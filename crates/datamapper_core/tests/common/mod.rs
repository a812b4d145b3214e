#![allow(dead_code)]

use datamapper_core::db::connect_in_memory;
use datamapper_core::rusqlite::Connection;
use datamapper_core::{Entity, Field, FieldVisitor, Mapping, UNSET_ID};

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i32,
}

impl Person {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            id: UNSET_ID,
            name: name.to_string(),
            age,
        }
    }
}

impl Default for Person {
    fn default() -> Self {
        Self::new("", 0)
    }
}

impl Entity for Person {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

fn visit_person<V: FieldVisitor<Person>>(visitor: &mut V) {
    visitor.visit_field(
        &Field::new("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name)
            .with_options("UNIQUE NOT NULL"),
    );
    visitor.visit_field(&Field::new(
        "age",
        |p: &Person| &p.age,
        |p: &mut Person| &mut p.age,
    ));
}

pub struct PersonMapping;

impl Mapping for PersonMapping {
    type Entity = Person;

    fn label() -> &'static str {
        "person"
    }

    fn accept<V: FieldVisitor<Person>>(visitor: &mut V) {
        visit_person(visitor);
    }
}

/// Same entity, separate table, with an extra index created alongside.
pub struct IndexedPersonMapping;

impl Mapping for IndexedPersonMapping {
    type Entity = Person;

    fn label() -> &'static str {
        "person_indexed"
    }

    fn accept<V: FieldVisitor<Person>>(visitor: &mut V) {
        visit_person(visitor);
    }

    fn custom_create_statements() -> String {
        "CREATE INDEX IF NOT EXISTS person_indexed_age_idx ON person_indexed (age)".to_string()
    }
}

/// Exercises every supported column type.
#[derive(Debug, Clone, PartialEq)]
pub struct Gadget {
    pub id: i64,
    pub label: String,
    pub serial: i64,
    pub weight: f64,
    pub in_stock: bool,
}

impl Default for Gadget {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            label: String::new(),
            serial: 0,
            weight: 0.0,
            in_stock: false,
        }
    }
}

impl Entity for Gadget {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

pub struct GadgetMapping;

impl Mapping for GadgetMapping {
    type Entity = Gadget;

    fn label() -> &'static str {
        "gadget"
    }

    fn accept<V: FieldVisitor<Gadget>>(visitor: &mut V) {
        visitor.visit_field(&Field::new(
            "label",
            |g: &Gadget| &g.label,
            |g: &mut Gadget| &mut g.label,
        ));
        visitor.visit_field(&Field::new(
            "serial",
            |g: &Gadget| &g.serial,
            |g: &mut Gadget| &mut g.serial,
        ));
        visitor.visit_field(&Field::new(
            "weight",
            |g: &Gadget| &g.weight,
            |g: &mut Gadget| &mut g.weight,
        ));
        visitor.visit_field(
            &Field::new(
                "in_stock",
                |g: &Gadget| &g.in_stock,
                |g: &mut Gadget| &mut g.in_stock,
            )
            .with_options("NOT NULL DEFAULT 0"),
        );
    }
}

pub fn person_db() -> Connection {
    let conn = connect_in_memory().unwrap();
    datamapper_core::Repository::<PersonMapping>::new(&conn)
        .unwrap()
        .create_table(true)
        .unwrap();
    conn
}

pub fn table_exists(conn: &Connection, table: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

pub fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
