//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `datamapper_core` linkage.
//! - Print the SQL and schema derived from a demo mapping, then run one
//!   in-memory CRUD round trip.
//! - Keep output deterministic for quick local sanity checks.

use datamapper_core::{
    connect_in_memory, Entity, Field, FieldVisitor, Mapping, Repository, StatementBuilder,
    UNSET_ID,
};
use std::error::Error;

#[derive(Debug, Clone, PartialEq)]
struct Book {
    id: i64,
    title: String,
    pages: i32,
    rating: f64,
    borrowed: bool,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            title: String::new(),
            pages: 0,
            rating: 0.0,
            borrowed: false,
        }
    }
}

impl Entity for Book {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

struct BookMapping;

impl Mapping for BookMapping {
    type Entity = Book;

    fn label() -> &'static str {
        "book"
    }

    fn accept<V: FieldVisitor<Book>>(visitor: &mut V) {
        visitor.visit_field(
            &Field::new("title", |b: &Book| &b.title, |b: &mut Book| &mut b.title)
                .with_options("NOT NULL"),
        );
        visitor.visit_field(&Field::new(
            "pages",
            |b: &Book| &b.pages,
            |b: &mut Book| &mut b.pages,
        ));
        visitor.visit_field(&Field::new(
            "rating",
            |b: &Book| &b.rating,
            |b: &mut Book| &mut b.rating,
        ));
        visitor.visit_field(&Field::new(
            "borrowed",
            |b: &Book| &b.borrowed,
            |b: &mut Book| &mut b.borrowed,
        ));
    }

    fn custom_create_statements() -> String {
        "CREATE INDEX IF NOT EXISTS book_title_idx ON book (title)".to_string()
    }
}

type BookSql = StatementBuilder<BookMapping>;

fn main() -> Result<(), Box<dyn Error>> {
    println!(
        "datamapper_core version={}",
        datamapper_core::core_version()
    );

    println!("create={}", BookSql::create_table_statement());
    println!("insert={}", BookSql::insert_statement());
    println!("update={}", BookSql::update_statement());
    println!("select_by_id={}", BookSql::select_by_id_statement());
    println!("delete_by_id={}", BookSql::delete_by_id_statement());
    println!(
        "schema={}",
        serde_json::to_string_pretty(&BookSql::table_schema())?
    );

    let conn = connect_in_memory()?;
    let mut books = Repository::<BookMapping>::new(&conn)?;
    books.create_table(true)?;

    let mut book = Book {
        title: "The Rust Programming Language".to_string(),
        pages: 560,
        rating: 4.7,
        ..Book::default()
    };
    books.save(&mut book, true)?;
    println!("saved id={}", book.id);

    book.borrowed = true;
    books.save(&mut book, true)?;
    let loaded = books.get(book.id)?;
    println!(
        "loaded id={} title={:?} borrowed={} roundtrip_ok={}",
        loaded.id,
        loaded.title,
        loaded.borrowed,
        loaded == book
    );

    books.delete_entity(&mut book, true, true)?;
    println!(
        "deleted remaining={} id_after_delete={}",
        books.get_all()?.len(),
        book.id
    );
    Ok(())
}
