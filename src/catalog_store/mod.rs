mod error;
mod memory_store;
mod models;
mod schema;
mod store;
mod trait_def;

pub use error::{StoreError, StoreResult};
pub use memory_store::InMemoryCatalogStore;
pub use models::*;
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;
