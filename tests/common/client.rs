//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all catalog-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    async fn put(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Authors
    // ========================================================================

    /// GET /authors
    pub async fn list_authors(&self) -> Response {
        self.get("/authors").await
    }

    /// GET /authors/{id}
    pub async fn get_author(&self, id: i64) -> Response {
        self.get(&format!("/authors/{}", id)).await
    }

    /// POST /authors
    pub async fn create_author(&self, body: &Value) -> Response {
        self.post("/authors", body).await
    }

    /// PUT /authors/{id}
    pub async fn update_author(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/authors/{}", id), body).await
    }

    /// DELETE /authors/{id}
    pub async fn delete_author(&self, id: i64) -> Response {
        self.delete(&format!("/authors/{}", id)).await
    }

    // ========================================================================
    // Publishers
    // ========================================================================

    /// GET /publishers
    pub async fn list_publishers(&self) -> Response {
        self.get("/publishers").await
    }

    /// GET /publishers/{id}
    pub async fn get_publisher(&self, id: i64) -> Response {
        self.get(&format!("/publishers/{}", id)).await
    }

    /// POST /publishers
    pub async fn create_publisher(&self, body: &Value) -> Response {
        self.post("/publishers", body).await
    }

    /// PUT /publishers/{id}
    pub async fn update_publisher(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/publishers/{}", id), body).await
    }

    /// DELETE /publishers/{id}
    pub async fn delete_publisher(&self, id: i64) -> Response {
        self.delete(&format!("/publishers/{}", id)).await
    }

    // ========================================================================
    // Books
    // ========================================================================

    /// GET /books
    pub async fn list_books(&self) -> Response {
        self.get("/books").await
    }

    /// GET /books/{id}
    pub async fn get_book(&self, id: i64) -> Response {
        self.get(&format!("/books/{}", id)).await
    }

    /// POST /books
    pub async fn create_book(&self, body: &Value) -> Response {
        self.post("/books", body).await
    }

    /// PUT /books/{id}
    pub async fn update_book(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/books/{}", id), body).await
    }

    /// DELETE /books/{id}
    pub async fn delete_book(&self, id: i64) -> Response {
        self.delete(&format!("/books/{}", id)).await
    }
}
