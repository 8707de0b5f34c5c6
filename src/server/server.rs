use anyhow::Result;
use std::time::Duration;

use tracing::{error, info};

use crate::catalog_store::{
    AuthorPayload, BookPayload, PublisherPayload, StoreError, StoreResult,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;

use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub authors: usize,
    pub publishers: usize,
    pub books: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Map a store outcome to an HTTP response, serializing the success value
/// as JSON with the given status code.
fn respond<T: Serialize>(result: StoreResult<T>, success_status: StatusCode) -> Response {
    match result {
        Ok(value) => (success_status, Json(value)).into_response(),
        Err(err) => store_error_response(err),
    }
}

/// NotFound maps to 404 with the error message, everything else (including
/// uniqueness violations) surfaces as 500.
fn store_error_response(err: StoreError) -> Response {
    if err.is_not_found() {
        (StatusCode::NOT_FOUND, format!("{}", err)).into_response()
    } else {
        error!("Catalog store error: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// A get by id: Some -> 200, None -> 404.
fn respond_lookup<T: Serialize>(
    result: StoreResult<Option<T>>,
    entity: &'static str,
    id: i64,
) -> Response {
    match result {
        Ok(Some(value)) => Json(value).into_response(),
        Ok(None) => store_error_response(StoreError::not_found(entity, id)),
        Err(err) => store_error_response(err),
    }
}

fn respond_deleted(result: StoreResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        authors: state.catalog_store.authors_count(),
        publishers: state.catalog_store.publishers_count(),
        books: state.catalog_store.books_count(),
    };
    Json(stats)
}

// =============================================================================
// Authors
// =============================================================================

async fn list_authors(State(store): State<GuardedCatalogStore>) -> Response {
    respond(store.list_authors(), StatusCode::OK)
}

async fn get_author(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
) -> Response {
    respond_lookup(store.get_author(id), "author", id)
}

async fn post_author(
    State(store): State<GuardedCatalogStore>,
    Json(payload): Json<AuthorPayload>,
) -> Response {
    respond(store.create_author(&payload), StatusCode::CREATED)
}

async fn put_author(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
    Json(payload): Json<AuthorPayload>,
) -> Response {
    respond(store.update_author(id, &payload), StatusCode::OK)
}

async fn delete_author(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
) -> Response {
    respond_deleted(store.delete_author(id))
}

// =============================================================================
// Publishers
// =============================================================================

async fn list_publishers(State(store): State<GuardedCatalogStore>) -> Response {
    respond(store.list_publishers(), StatusCode::OK)
}

async fn get_publisher(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
) -> Response {
    respond_lookup(store.get_publisher(id), "publisher", id)
}

async fn post_publisher(
    State(store): State<GuardedCatalogStore>,
    Json(payload): Json<PublisherPayload>,
) -> Response {
    respond(store.create_publisher(&payload), StatusCode::CREATED)
}

async fn put_publisher(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
    Json(payload): Json<PublisherPayload>,
) -> Response {
    respond(store.update_publisher(id, &payload), StatusCode::OK)
}

async fn delete_publisher(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
) -> Response {
    respond_deleted(store.delete_publisher(id))
}

// =============================================================================
// Books
// =============================================================================

async fn list_books(State(store): State<GuardedCatalogStore>) -> Response {
    respond(store.list_books(), StatusCode::OK)
}

async fn get_book(State(store): State<GuardedCatalogStore>, Path(id): Path<i64>) -> Response {
    respond_lookup(store.get_book(id), "book", id)
}

async fn post_book(
    State(store): State<GuardedCatalogStore>,
    Json(payload): Json<BookPayload>,
) -> Response {
    respond(store.create_book(&payload), StatusCode::CREATED)
}

async fn put_book(
    State(store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
    Json(payload): Json<BookPayload>,
) -> Response {
    respond(store.update_book(id, &payload), StatusCode::OK)
}

async fn delete_book(State(store): State<GuardedCatalogStore>, Path(id): Path<i64>) -> Response {
    respond_deleted(store.delete_book(id))
}

pub fn make_app(config: ServerConfig, catalog_store: GuardedCatalogStore) -> Router {
    let state = ServerState::new(config, catalog_store);

    let app: Router = Router::new()
        .route("/", get(home))
        .route("/authors", get(list_authors))
        .route("/authors", post(post_author))
        .route("/authors/{id}", get(get_author))
        .route("/authors/{id}", put(put_author))
        .route("/authors/{id}", delete(delete_author))
        .route("/publishers", get(list_publishers))
        .route("/publishers", post(post_publisher))
        .route("/publishers/{id}", get(get_publisher))
        .route("/publishers/{id}", put(put_publisher))
        .route("/publishers/{id}", delete(delete_publisher))
        .route("/books", get(list_books))
        .route("/books", post(post_book))
        .route("/books/{id}", get(get_book))
        .route("/books/{id}", put(put_book))
        .route("/books/{id}", delete(delete_book))
        .with_state(state.clone());

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, catalog_store: GuardedCatalogStore) -> Result<()> {
    let port = config.port;
    let app = make_app(config, catalog_store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
