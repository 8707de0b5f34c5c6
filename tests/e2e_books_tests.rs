//! End-to-end tests for the book endpoints

mod common;

use common::{TestClient, TestServer, AUTHOR_HERBERT_NAME, BOOK_DUNE_ISBN, BOOK_DUNE_NAME};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn author_ids(book: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = book["authors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn get_book_embeds_publisher_and_authors() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_book(server.seed.book_dune.id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let book: Value = response.json().await.unwrap();
    assert_eq!(book["name"], BOOK_DUNE_NAME);
    assert_eq!(book["isbn"], BOOK_DUNE_ISBN);
    assert_eq!(book["publisher"]["id"], server.seed.publisher_ace.id);
    assert_eq!(book["authors"][0]["name"], AUTHOR_HERBERT_NAME);
    assert!(book["created"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn list_books_returns_resolved_books() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.list_books().await;
    assert_eq!(response.status(), StatusCode::OK);

    let books: Vec<Value> = response.json().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["publisher"]["name"], "Ace Books");
}

#[tokio::test]
async fn create_book_links_requested_authors() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_book(&json!({
            "name": "Dune: House Atreides",
            "isbn": "9780553110616",
            "rating": 3.9,
            "price": 7.99,
            "stock": 4,
            "publisher_id": server.seed.publisher_tor.id,
            "authors": [server.seed.author_herbert.id, server.seed.author_anderson.id],
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = response.json().await.unwrap();
    let mut expected = vec![
        server.seed.author_herbert.id,
        server.seed.author_anderson.id,
    ];
    expected.sort();
    assert_eq!(author_ids(&created), expected);

    // Round trip through a fresh read
    let id = created["id"].as_i64().unwrap();
    let response = client.get_book(id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_book_with_defaulted_fields() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_book(&json!({
            "name": "Untitled Draft",
            "isbn": "0000000000000",
            "publisher_id": server.seed.publisher_tor.id,
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = response.json().await.unwrap();
    assert_eq!(created["rating"], 0.0);
    assert_eq!(created["price"], 0.0);
    assert_eq!(created["stock"], 0);
    assert_eq!(created["authors"], json!([]));
}

#[tokio::test]
async fn create_book_with_unknown_author_writes_nothing() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_book(&json!({
            "name": "Phantom",
            "isbn": "1111111111111",
            "publisher_id": server.seed.publisher_ace.id,
            "authors": [server.seed.author_herbert.id, 999],
        }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // No book row persisted
    let response = client.list_books().await;
    let books: Vec<Value> = response.json().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["name"], BOOK_DUNE_NAME);
}

#[tokio::test]
async fn create_book_with_unknown_publisher_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_book(&json!({
            "name": "Phantom",
            "isbn": "1111111111111",
            "publisher_id": 999,
        }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_book_replaces_fields_and_author_set() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let id = server.seed.book_dune.id;
    let response = client
        .update_book(
            id,
            &json!({
                "name": "Dune (Deluxe Edition)",
                "isbn": BOOK_DUNE_ISBN,
                "rating": 4.8,
                "price": 24.99,
                "stock": 3,
                "publisher_id": server.seed.publisher_tor.id,
                "authors": [server.seed.author_anderson.id],
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["name"], "Dune (Deluxe Edition)");
    assert_eq!(updated["publisher"]["id"], server.seed.publisher_tor.id);
    assert_eq!(author_ids(&updated), vec![server.seed.author_anderson.id]);
    // The created timestamp never changes
    assert_eq!(
        updated["created"].as_i64().unwrap(),
        server.seed.book_dune.created
    );
}

#[tokio::test]
async fn update_book_with_unknown_author_leaves_book_intact() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let id = server.seed.book_dune.id;
    let response = client
        .update_book(
            id,
            &json!({
                "name": "Should Not Apply",
                "isbn": BOOK_DUNE_ISBN,
                "publisher_id": server.seed.publisher_ace.id,
                "authors": [999],
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get_book(id).await;
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["name"], BOOK_DUNE_NAME);
    assert_eq!(author_ids(&book), vec![server.seed.author_herbert.id]);
}

#[tokio::test]
async fn update_unknown_book_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .update_book(
            999,
            &json!({
                "name": "Nothing",
                "isbn": "2222222222222",
                "publisher_id": server.seed.publisher_ace.id,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_book_returns_204_and_keeps_authors() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let id = server.seed.book_dune.id;
    let response = client.delete_book(id).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get_book(id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get_author(server.seed.author_herbert.id).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn home_reports_catalog_counts() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);

    let stats: Value = response.json().await.unwrap();
    assert_eq!(stats["authors"], 2);
    assert_eq!(stats["publishers"], 2);
    assert_eq!(stats["books"], 1);
    assert!(stats["uptime"].is_string());
}
