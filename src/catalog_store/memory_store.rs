//! In-memory catalog store implementation.
//!
//! A HashMap-backed implementation of CatalogStore with the same visible
//! semantics as the SQLite store. Used by router unit tests that do not want
//! a database file on disk.

use super::error::{StoreError, StoreResult};
use super::models::{Author, AuthorPayload, Book, BookPayload, Publisher, PublisherPayload};
use super::trait_def::CatalogStore;
use anyhow::anyhow;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    authors: HashMap<i64, Author>,
    publishers: HashMap<i64, Publisher>,
    books: HashMap<i64, StoredBook>,
    next_id: i64,
}

/// Book row as stored, relations kept as ids and resolved on read.
#[derive(Clone)]
struct StoredBook {
    id: i64,
    name: String,
    isbn: String,
    rating: f64,
    price: f64,
    stock: i32,
    created: i64,
    publisher_id: i64,
    author_ids: BTreeSet<i64>,
}

/// In-memory catalog store, mirroring the SQLite store's behavior.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    inner: Mutex<Inner>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn unique_author_name(&self, name: &str, exclude_id: Option<i64>) -> StoreResult<()> {
        let taken = self
            .authors
            .values()
            .any(|a| a.name == name && Some(a.id) != exclude_id);
        if taken {
            return Err(StoreError::Other(anyhow!(
                "UNIQUE constraint failed: authors.name"
            )));
        }
        Ok(())
    }

    fn unique_publisher_name(&self, name: &str, exclude_id: Option<i64>) -> StoreResult<()> {
        let taken = self
            .publishers
            .values()
            .any(|p| p.name == name && Some(p.id) != exclude_id);
        if taken {
            return Err(StoreError::Other(anyhow!(
                "UNIQUE constraint failed: publishers.name"
            )));
        }
        Ok(())
    }

    fn resolve_author_ids(&self, author_ids: &[i64]) -> StoreResult<BTreeSet<i64>> {
        let unique: BTreeSet<i64> = author_ids.iter().copied().collect();
        for id in &unique {
            if !self.authors.contains_key(id) {
                return Err(StoreError::not_found("author", *id));
            }
        }
        Ok(unique)
    }

    fn resolve_book(&self, stored: &StoredBook) -> StoreResult<Book> {
        let publisher = self
            .publishers
            .get(&stored.publisher_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("publisher", stored.publisher_id))?;

        let mut authors: Vec<Author> = stored
            .author_ids
            .iter()
            .filter_map(|id| self.authors.get(id).cloned())
            .collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Book {
            id: stored.id,
            name: stored.name.clone(),
            isbn: stored.isbn.clone(),
            rating: stored.rating,
            price: stored.price,
            stock: stored.stock,
            created: stored.created,
            publisher,
            authors,
        })
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

impl CatalogStore for InMemoryCatalogStore {
    fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let inner = self.inner.lock().unwrap();
        let mut authors: Vec<Author> = inner.authors.values().cloned().collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(authors)
    }

    fn get_author(&self, id: i64) -> StoreResult<Option<Author>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.authors.get(&id).cloned())
    }

    fn create_author(&self, payload: &AuthorPayload) -> StoreResult<Author> {
        let mut inner = self.inner.lock().unwrap();
        inner.unique_author_name(&payload.name, None)?;
        let id = inner.allocate_id();
        let author = Author {
            id,
            name: payload.name.clone(),
        };
        inner.authors.insert(id, author.clone());
        Ok(author)
    }

    fn update_author(&self, id: i64, payload: &AuthorPayload) -> StoreResult<Author> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.authors.contains_key(&id) {
            return Err(StoreError::not_found("author", id));
        }
        inner.unique_author_name(&payload.name, Some(id))?;
        let author = Author {
            id,
            name: payload.name.clone(),
        };
        inner.authors.insert(id, author.clone());
        Ok(author)
    }

    fn delete_author(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.authors.remove(&id).is_none() {
            return Err(StoreError::not_found("author", id));
        }
        for book in inner.books.values_mut() {
            book.author_ids.remove(&id);
        }
        Ok(())
    }

    fn list_publishers(&self) -> StoreResult<Vec<Publisher>> {
        let inner = self.inner.lock().unwrap();
        let mut publishers: Vec<Publisher> = inner.publishers.values().cloned().collect();
        publishers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(publishers)
    }

    fn get_publisher(&self, id: i64) -> StoreResult<Option<Publisher>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.publishers.get(&id).cloned())
    }

    fn create_publisher(&self, payload: &PublisherPayload) -> StoreResult<Publisher> {
        let mut inner = self.inner.lock().unwrap();
        inner.unique_publisher_name(&payload.name, None)?;
        let id = inner.allocate_id();
        let publisher = Publisher {
            id,
            name: payload.name.clone(),
            score: payload.score,
        };
        inner.publishers.insert(id, publisher.clone());
        Ok(publisher)
    }

    fn update_publisher(&self, id: i64, payload: &PublisherPayload) -> StoreResult<Publisher> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.publishers.contains_key(&id) {
            return Err(StoreError::not_found("publisher", id));
        }
        inner.unique_publisher_name(&payload.name, Some(id))?;
        let publisher = Publisher {
            id,
            name: payload.name.clone(),
            score: payload.score,
        };
        inner.publishers.insert(id, publisher.clone());
        Ok(publisher)
    }

    fn delete_publisher(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.publishers.remove(&id).is_none() {
            return Err(StoreError::not_found("publisher", id));
        }
        // Cascade: books of the deleted publisher disappear too
        inner.books.retain(|_, book| book.publisher_id != id);
        Ok(())
    }

    fn list_books(&self) -> StoreResult<Vec<Book>> {
        let inner = self.inner.lock().unwrap();
        let mut books = inner
            .books
            .values()
            .map(|stored| inner.resolve_book(stored))
            .collect::<StoreResult<Vec<Book>>>()?;
        books.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(books)
    }

    fn get_book(&self, id: i64) -> StoreResult<Option<Book>> {
        let inner = self.inner.lock().unwrap();
        match inner.books.get(&id) {
            Some(stored) => Ok(Some(inner.resolve_book(stored)?)),
            None => Ok(None),
        }
    }

    fn create_book(&self, payload: &BookPayload) -> StoreResult<Book> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.publishers.contains_key(&payload.publisher_id) {
            return Err(StoreError::not_found("publisher", payload.publisher_id));
        }
        let author_ids = inner.resolve_author_ids(&payload.authors)?;

        let id = inner.allocate_id();
        let stored = StoredBook {
            id,
            name: payload.name.clone(),
            isbn: payload.isbn.clone(),
            rating: payload.rating,
            price: payload.price,
            stock: payload.stock,
            created: now_unix(),
            publisher_id: payload.publisher_id,
            author_ids,
        };
        let book = inner.resolve_book(&stored)?;
        inner.books.insert(id, stored);
        Ok(book)
    }

    fn update_book(&self, id: i64, payload: &BookPayload) -> StoreResult<Book> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.publishers.contains_key(&payload.publisher_id) {
            return Err(StoreError::not_found("publisher", payload.publisher_id));
        }
        let author_ids = inner.resolve_author_ids(&payload.authors)?;

        let created = match inner.books.get(&id) {
            Some(existing) => existing.created,
            None => return Err(StoreError::not_found("book", id)),
        };

        let stored = StoredBook {
            id,
            name: payload.name.clone(),
            isbn: payload.isbn.clone(),
            rating: payload.rating,
            price: payload.price,
            stock: payload.stock,
            created,
            publisher_id: payload.publisher_id,
            author_ids,
        };
        let book = inner.resolve_book(&stored)?;
        inner.books.insert(id, stored);
        Ok(book)
    }

    fn delete_book(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.books.remove(&id).is_none() {
            return Err(StoreError::not_found("book", id));
        }
        Ok(())
    }

    fn sync_book_authors(&self, book_id: i64, author_ids: &[i64]) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.books.contains_key(&book_id) {
            return Err(StoreError::not_found("book", book_id));
        }
        let resolved = inner.resolve_author_ids(author_ids)?;
        if let Some(book) = inner.books.get_mut(&book_id) {
            book.author_ids = resolved;
        }
        Ok(())
    }

    fn authors_count(&self) -> usize {
        self.inner.lock().unwrap().authors.len()
    }

    fn publishers_count(&self) -> usize {
        self.inner.lock().unwrap().publishers.len()
    }

    fn books_count(&self) -> usize {
        self.inner.lock().unwrap().books.len()
    }
}
