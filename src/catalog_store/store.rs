//! SQLite-backed catalog store implementation.
//!
//! Uses a single write connection plus a round-robin pool of read-only
//! connections, all in WAL mode. Every multi-step write (book row plus
//! membership edges) runs inside one IMMEDIATE transaction, so callers never
//! observe a partially-linked book.

use super::error::{StoreError, StoreResult};
use super::models::{Author, AuthorPayload, Book, BookPayload, Publisher, PublisherPayload};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed bookstore catalog store.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    // Check if this is a brand new database (no tables exist)
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let mut current_version = if db_version < BASE_DB_VERSION as i64 {
        0
    } else {
        (db_version - BASE_DB_VERSION as i64) as usize
    };

    if current_version >= latest_version {
        latest_schema.validate(conn)?;
        return Ok(());
    }

    let tx = conn.transaction()?;
    for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
        if let Some(migration_fn) = schema.migration {
            info!(
                "Migrating catalog db from version {} to {}",
                current_version, schema.version
            );
            migration_fn(&tx)?;
            current_version = schema.version;
        }
    }
    tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
    tx.commit()?;
    Ok(())
}

impl SqliteCatalogStore {
    /// Create a new SqliteCatalogStore.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections for concurrent read operations
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        // Foreign key enforcement is per-connection; the publisher -> books
        // cascade depends on it.
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    // =========================================================================
    // Internal Helper Methods
    // =========================================================================

    fn parse_author_row(row: &rusqlite::Row) -> rusqlite::Result<Author> {
        Ok(Author {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn parse_publisher_row(row: &rusqlite::Row) -> rusqlite::Result<Publisher> {
        Ok(Publisher {
            id: row.get(0)?,
            name: row.get(1)?,
            score: row.get(2)?,
        })
    }

    /// Parse a Book from a row of the books + publishers join
    /// (b.id, b.name, b.isbn, b.rating, b.price, b.stock, b.created,
    ///  p.id, p.name, p.score).
    fn parse_book_row(row: &rusqlite::Row, authors: Vec<Author>) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            name: row.get(1)?,
            isbn: row.get(2)?,
            rating: row.get(3)?,
            price: row.get(4)?,
            stock: row.get(5)?,
            created: row.get(6)?,
            publisher: Publisher {
                id: row.get(7)?,
                name: row.get(8)?,
                score: row.get(9)?,
            },
            authors,
        })
    }

    /// Get the authors linked to a book, ordered by name.
    fn get_book_authors(conn: &Connection, book_id: i64) -> StoreResult<Vec<Author>> {
        let mut stmt = conn.prepare_cached(
            "SELECT a.id, a.name FROM authors a
             INNER JOIN book_authors ba ON a.id = ba.author_id
             WHERE ba.book_id = ?1
             ORDER BY a.name",
        )?;
        let authors = stmt
            .query_map(params![book_id], Self::parse_author_row)?
            .collect::<Result<Vec<Author>, _>>()?;
        Ok(authors)
    }

    /// Get a book with resolved relations using an already-held connection.
    fn get_book_inner(conn: &Connection, id: i64) -> StoreResult<Option<Book>> {
        let authors = Self::get_book_authors(conn, id)?;

        let mut stmt = conn.prepare_cached(
            "SELECT b.id, b.name, b.isbn, b.rating, b.price, b.stock, b.created,
                    p.id, p.name, p.score
             FROM books b
             INNER JOIN publishers p ON b.publisher_id = p.id
             WHERE b.id = ?1",
        )?;
        match stmt.query_row(params![id], |row| Self::parse_book_row(row, authors.clone())) {
            Ok(book) => Ok(Some(book)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check that a publisher id resolves, failing with NotFound otherwise.
    fn require_publisher(conn: &Connection, id: i64) -> StoreResult<()> {
        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM publishers WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        match exists {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found("publisher", id)),
        }
    }

    /// Resolve every requested author id before any edge is written.
    ///
    /// Duplicates collapse. Any id that does not resolve aborts the whole
    /// operation, so a partially-linked book is never observable.
    fn resolve_author_ids(conn: &Connection, author_ids: &[i64]) -> StoreResult<BTreeSet<i64>> {
        let unique: BTreeSet<i64> = author_ids.iter().copied().collect();
        for author_id in &unique {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT id FROM authors WHERE id = ?1",
                    params![author_id],
                    |r| r.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::not_found("author", *author_id));
            }
        }
        Ok(unique)
    }

    /// Replace a book's membership edges with exactly `author_ids`.
    /// Caller must have resolved the ids and hold the transaction.
    fn replace_author_edges(
        conn: &Connection,
        book_id: i64,
        author_ids: &BTreeSet<i64>,
    ) -> StoreResult<()> {
        conn.execute(
            "DELETE FROM book_authors WHERE book_id = ?1",
            params![book_id],
        )?;
        for author_id in author_ids {
            conn.execute(
                "INSERT INTO book_authors (book_id, author_id) VALUES (?1, ?2)",
                params![book_id, author_id],
            )?;
        }
        Ok(())
    }

    /// Run `body` inside a BEGIN IMMEDIATE transaction on the write
    /// connection, committing on success and rolling back on error.
    fn with_write_txn<T>(
        &self,
        body: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        match body(&conn) {
            Ok(value) => {
                conn.execute("COMMIT", [])?;
                Ok(value)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }
}

impl CatalogStore for SqliteCatalogStore {
    // =========================================================================
    // Authors
    // =========================================================================

    fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let mut stmt = conn.prepare_cached("SELECT id, name FROM authors ORDER BY name")?;
        let authors = stmt
            .query_map([], Self::parse_author_row)?
            .collect::<Result<Vec<Author>, _>>()?;
        Ok(authors)
    }

    fn get_author(&self, id: i64) -> StoreResult<Option<Author>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let mut stmt = conn.prepare_cached("SELECT id, name FROM authors WHERE id = ?1")?;
        match stmt.query_row(params![id], Self::parse_author_row) {
            Ok(author) => Ok(Some(author)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn create_author(&self, payload: &AuthorPayload) -> StoreResult<Author> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO authors (name) VALUES (?1)",
            params![payload.name],
        )?;
        Ok(Author {
            id: conn.last_insert_rowid(),
            name: payload.name.clone(),
        })
    }

    fn update_author(&self, id: i64, payload: &AuthorPayload) -> StoreResult<Author> {
        let conn = self.write_conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE authors SET name = ?1 WHERE id = ?2",
            params![payload.name, id],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("author", id));
        }
        Ok(Author {
            id,
            name: payload.name.clone(),
        })
    }

    fn delete_author(&self, id: i64) -> StoreResult<()> {
        let conn = self.write_conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM authors WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::not_found("author", id));
        }
        Ok(())
    }

    // =========================================================================
    // Publishers
    // =========================================================================

    fn list_publishers(&self) -> StoreResult<Vec<Publisher>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let mut stmt =
            conn.prepare_cached("SELECT id, name, score FROM publishers ORDER BY name")?;
        let publishers = stmt
            .query_map([], Self::parse_publisher_row)?
            .collect::<Result<Vec<Publisher>, _>>()?;
        Ok(publishers)
    }

    fn get_publisher(&self, id: i64) -> StoreResult<Option<Publisher>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let mut stmt =
            conn.prepare_cached("SELECT id, name, score FROM publishers WHERE id = ?1")?;
        match stmt.query_row(params![id], Self::parse_publisher_row) {
            Ok(publisher) => Ok(Some(publisher)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn create_publisher(&self, payload: &PublisherPayload) -> StoreResult<Publisher> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO publishers (name, score) VALUES (?1, ?2)",
            params![payload.name, payload.score],
        )?;
        Ok(Publisher {
            id: conn.last_insert_rowid(),
            name: payload.name.clone(),
            score: payload.score,
        })
    }

    fn update_publisher(&self, id: i64, payload: &PublisherPayload) -> StoreResult<Publisher> {
        let conn = self.write_conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE publishers SET name = ?1, score = ?2 WHERE id = ?3",
            params![payload.name, payload.score, id],
        )?;
        if updated == 0 {
            return Err(StoreError::not_found("publisher", id));
        }
        Ok(Publisher {
            id,
            name: payload.name.clone(),
            score: payload.score,
        })
    }

    fn delete_publisher(&self, id: i64) -> StoreResult<()> {
        // Books and their membership edges go with the publisher through the
        // ON DELETE CASCADE chain.
        let conn = self.write_conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM publishers WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::not_found("publisher", id));
        }
        Ok(())
    }

    // =========================================================================
    // Books
    // =========================================================================

    fn list_books(&self) -> StoreResult<Vec<Book>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();

        let mut stmt = conn.prepare_cached(
            "SELECT b.id, b.name, b.isbn, b.rating, b.price, b.stock, b.created,
                    p.id, p.name, p.score
             FROM books b
             INNER JOIN publishers p ON b.publisher_id = p.id
             ORDER BY b.name",
        )?;

        let mut books = stmt
            .query_map([], |row| Self::parse_book_row(row, Vec::new()))?
            .collect::<Result<Vec<Book>, _>>()?;

        for book in &mut books {
            book.authors = Self::get_book_authors(&conn, book.id)?;
        }
        Ok(books)
    }

    fn get_book(&self, id: i64) -> StoreResult<Option<Book>> {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        Self::get_book_inner(&conn, id)
    }

    fn create_book(&self, payload: &BookPayload) -> StoreResult<Book> {
        self.with_write_txn(|conn| {
            Self::require_publisher(conn, payload.publisher_id)?;
            let author_ids = Self::resolve_author_ids(conn, &payload.authors)?;

            conn.execute(
                "INSERT INTO books (name, isbn, rating, price, stock, publisher_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    payload.name,
                    payload.isbn,
                    payload.rating,
                    payload.price,
                    payload.stock,
                    payload.publisher_id,
                ],
            )?;
            let book_id = conn.last_insert_rowid();

            Self::replace_author_edges(conn, book_id, &author_ids)?;

            Self::get_book_inner(conn, book_id)?
                .ok_or_else(|| StoreError::not_found("book", book_id))
        })
    }

    fn update_book(&self, id: i64, payload: &BookPayload) -> StoreResult<Book> {
        self.with_write_txn(|conn| {
            Self::require_publisher(conn, payload.publisher_id)?;
            let author_ids = Self::resolve_author_ids(conn, &payload.authors)?;

            // Full replacement of every scalar field except the immutable
            // created timestamp.
            let updated = conn.execute(
                "UPDATE books SET name = ?1, isbn = ?2, rating = ?3, price = ?4,
                 stock = ?5, publisher_id = ?6 WHERE id = ?7",
                params![
                    payload.name,
                    payload.isbn,
                    payload.rating,
                    payload.price,
                    payload.stock,
                    payload.publisher_id,
                    id,
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::not_found("book", id));
            }

            Self::replace_author_edges(conn, id, &author_ids)?;

            Self::get_book_inner(conn, id)?.ok_or_else(|| StoreError::not_found("book", id))
        })
    }

    fn delete_book(&self, id: i64) -> StoreResult<()> {
        let conn = self.write_conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::not_found("book", id));
        }
        Ok(())
    }

    fn sync_book_authors(&self, book_id: i64, author_ids: &[i64]) -> StoreResult<()> {
        self.with_write_txn(|conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT id FROM books WHERE id = ?1",
                    params![book_id],
                    |r| r.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::not_found("book", book_id));
            }

            let author_ids = Self::resolve_author_ids(conn, author_ids)?;
            Self::replace_author_edges(conn, book_id, &author_ids)
        })
    }

    // =========================================================================
    // Counts
    // =========================================================================

    fn authors_count(&self) -> usize {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM authors", [], |r| r.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    fn publishers_count(&self) -> usize {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM publishers", [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }

    fn books_count(&self) -> usize {
        let read_conn = self.get_read_conn();
        let conn = read_conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM books", [], |r| r.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }
}
