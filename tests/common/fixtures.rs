//! Test fixture creation for the catalog database
//!
//! Seeds a small catalog through the store API so tests start from a known
//! state: two publishers, two authors, and one book linking them.

use super::constants::*;
use anyhow::Result;
use bookstore_catalog_server::catalog_store::{
    Author, AuthorPayload, Book, BookPayload, CatalogStore, Publisher, PublisherPayload,
    SqliteCatalogStore,
};
use tempfile::TempDir;

/// Ids and entities seeded into every test server's catalog.
pub struct SeededCatalog {
    pub publisher_ace: Publisher,
    pub publisher_tor: Publisher,
    pub author_herbert: Author,
    pub author_anderson: Author,
    pub book_dune: Book,
}

/// Creates a temporary catalog database and seeds it.
/// Returns (temp_dir, store, seeded entities).
pub fn create_test_catalog() -> Result<(TempDir, SqliteCatalogStore, SeededCatalog)> {
    let temp_dir = TempDir::new()?;
    let store = SqliteCatalogStore::new(temp_dir.path().join("catalog.db"), 2)?;

    let publisher_ace = store.create_publisher(&PublisherPayload {
        name: PUBLISHER_ACE_NAME.to_string(),
        score: 8,
    })?;
    let publisher_tor = store.create_publisher(&PublisherPayload {
        name: PUBLISHER_TOR_NAME.to_string(),
        score: 9,
    })?;

    let author_herbert = store.create_author(&AuthorPayload {
        name: AUTHOR_HERBERT_NAME.to_string(),
    })?;
    let author_anderson = store.create_author(&AuthorPayload {
        name: AUTHOR_ANDERSON_NAME.to_string(),
    })?;

    let book_dune = store.create_book(&BookPayload {
        name: BOOK_DUNE_NAME.to_string(),
        isbn: BOOK_DUNE_ISBN.to_string(),
        rating: 4.5,
        price: 9.99,
        stock: 10,
        publisher_id: publisher_ace.id,
        authors: vec![author_herbert.id],
    })?;

    let seeded = SeededCatalog {
        publisher_ace,
        publisher_tor,
        author_herbert,
        author_anderson,
        book_dune,
    };

    Ok((temp_dir, store, seeded))
}
