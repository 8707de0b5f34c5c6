//! SQLite schema definitions for the bookstore catalog database.
//!
//! Entities use integer rowid primary keys. The book -> publisher foreign
//! key cascades on delete, so removing a publisher removes its books; the
//! join table cascades off books, so membership edges disappear with the
//! book row.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

// =============================================================================
// Core Tables
// =============================================================================

const AUTHORS_TABLE: Table = Table {
    name: "authors",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_authors_name", "name")],
    unique_constraints: &[&["name"]],
};

const PUBLISHERS_TABLE: Table = Table {
    name: "publishers",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "score",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[("idx_publishers_name", "name")],
    unique_constraints: &[&["name"]],
};

const BOOKS_PUBLISHER_FK: ForeignKey = ForeignKey {
    foreign_table: "publishers",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const BOOKS_TABLE: Table = Table {
    name: "books",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("isbn", &SqlType::Text, non_null = true),
        sqlite_column!(
            "rating",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0.0")
        ),
        sqlite_column!(
            "price",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0.0")
        ),
        sqlite_column!(
            "stock",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "publisher_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BOOKS_PUBLISHER_FK)
        ),
    ],
    indices: &[
        ("idx_books_name", "name"),
        ("idx_books_publisher", "publisher_id"),
    ],
    unique_constraints: &[],
};

// =============================================================================
// Junction Table
// =============================================================================

const BOOK_AUTHORS_BOOK_FK: ForeignKey = ForeignKey {
    foreign_table: "books",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const BOOK_AUTHORS_AUTHOR_FK: ForeignKey = ForeignKey {
    foreign_table: "authors",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Book <-> Author membership. No ordering significance, no duplicates.
const BOOK_AUTHORS_TABLE: Table = Table {
    name: "book_authors",
    columns: &[
        sqlite_column!(
            "book_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BOOK_AUTHORS_BOOK_FK)
        ),
        sqlite_column!(
            "author_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BOOK_AUTHORS_AUTHOR_FK)
        ),
    ],
    indices: &[
        ("idx_book_authors_book", "book_id"),
        ("idx_book_authors_author", "author_id"),
    ],
    unique_constraints: &[&["book_id", "author_id"]],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        AUTHORS_TABLE,
        PUBLISHERS_TABLE,
        BOOKS_TABLE,
        BOOK_AUTHORS_TABLE,
    ],
    migration: None,
}];
