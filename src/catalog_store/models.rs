//! Bookstore catalog models for SQLite-backed storage.
//!
//! Response models carry fully resolved relations (a book embeds its
//! publisher and authors), payload models carry the referencing ids.

use serde::{Deserialize, Serialize};

// =============================================================================
// Core Entities
// =============================================================================

/// Author entity
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// Publisher entity
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub score: u32,
}

/// Book entity with resolved relations
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub isbn: String,
    pub rating: f64,
    pub price: f64,
    pub stock: i32,
    /// Unix timestamp (seconds) set by the store at insertion, never updated.
    pub created: i64,
    pub publisher: Publisher,
    pub authors: Vec<Author>,
}

// =============================================================================
// Write Payloads
// =============================================================================

/// Input payload for author create/update
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorPayload {
    pub name: String,
}

/// Input payload for publisher create/update
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublisherPayload {
    pub name: String,
    #[serde(default)]
    pub score: u32,
}

/// Input payload for book create/update.
///
/// Updates are full replacements: every scalar field is overwritten and the
/// author set is replaced with exactly `authors`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookPayload {
    pub name: String,
    pub isbn: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i32,
    pub publisher_id: i64,
    #[serde(default)]
    pub authors: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_payload_defaults_optional_fields() {
        let payload: BookPayload = serde_json::from_str(
            r#"{"name": "Dune", "isbn": "9780441013593", "publisher_id": 1}"#,
        )
        .unwrap();

        assert_eq!(payload.rating, 0.0);
        assert_eq!(payload.price, 0.0);
        assert_eq!(payload.stock, 0);
        assert!(payload.authors.is_empty());
    }

    #[test]
    fn book_serializes_with_nested_relations() {
        let book = Book {
            id: 3,
            name: "Dune".to_string(),
            isbn: "9780441013593".to_string(),
            rating: 4.5,
            price: 9.99,
            stock: 10,
            created: 1700000000,
            publisher: Publisher {
                id: 1,
                name: "Ace Books".to_string(),
                score: 5,
            },
            authors: vec![Author {
                id: 7,
                name: "Frank Herbert".to_string(),
            }],
        };

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["publisher"]["id"], 1);
        assert_eq!(json["authors"][0]["id"], 7);
        assert_eq!(json["created"], 1700000000);
    }
}
