//! CatalogStore trait definition.
//!
//! This trait abstracts the Record Access Layer so the server can work with
//! either the SQLite-backed store or the in-memory store transparently.

use super::error::StoreResult;
use super::models::{Author, AuthorPayload, Book, BookPayload, Publisher, PublisherPayload};

/// Trait for bookstore catalog storage backends.
///
/// Write operations are all-or-nothing: a book create or update either
/// applies the row write and every membership edge, or nothing at all. Any
/// payload referencing a nonexistent publisher or author id fails with
/// `StoreError::NotFound` before any write becomes visible.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Authors
    // =========================================================================

    /// List all authors, ordered by name.
    fn list_authors(&self) -> StoreResult<Vec<Author>>;

    /// Get an author by id.
    fn get_author(&self, id: i64) -> StoreResult<Option<Author>>;

    /// Create a new author. Returns the created author.
    fn create_author(&self, payload: &AuthorPayload) -> StoreResult<Author>;

    /// Replace an author's fields. Returns the updated author.
    fn update_author(&self, id: i64, payload: &AuthorPayload) -> StoreResult<Author>;

    /// Delete an author by id.
    fn delete_author(&self, id: i64) -> StoreResult<()>;

    // =========================================================================
    // Publishers
    // =========================================================================

    /// List all publishers, ordered by name.
    fn list_publishers(&self) -> StoreResult<Vec<Publisher>>;

    /// Get a publisher by id.
    fn get_publisher(&self, id: i64) -> StoreResult<Option<Publisher>>;

    /// Create a new publisher. Returns the created publisher.
    fn create_publisher(&self, payload: &PublisherPayload) -> StoreResult<Publisher>;

    /// Replace a publisher's fields. Returns the updated publisher.
    fn update_publisher(&self, id: i64, payload: &PublisherPayload) -> StoreResult<Publisher>;

    /// Delete a publisher by id. Deleting a publisher deletes its books.
    fn delete_publisher(&self, id: i64) -> StoreResult<()>;

    // =========================================================================
    // Books
    // =========================================================================

    /// List all books with resolved relations, ordered by name.
    fn list_books(&self) -> StoreResult<Vec<Book>>;

    /// Get a book by id with resolved relations.
    fn get_book(&self, id: i64) -> StoreResult<Option<Book>>;

    /// Create a new book and link every author in the payload.
    fn create_book(&self, payload: &BookPayload) -> StoreResult<Book>;

    /// Full-replace a book's scalar fields (except `created`) and its
    /// author set.
    fn update_book(&self, id: i64, payload: &BookPayload) -> StoreResult<Book>;

    /// Delete a book by id. Membership edges go with the row.
    fn delete_book(&self, id: i64) -> StoreResult<()>;

    /// Make the book's persisted author membership exactly equal to
    /// `author_ids`, treated as a set. All-or-nothing.
    fn sync_book_authors(&self, book_id: i64, author_ids: &[i64]) -> StoreResult<()>;

    // =========================================================================
    // Counts (startup logging)
    // =========================================================================

    /// Number of authors in the catalog.
    fn authors_count(&self) -> usize;

    /// Number of publishers in the catalog.
    fn publishers_count(&self) -> usize;

    /// Number of books in the catalog.
    fn books_count(&self) -> usize;
}
