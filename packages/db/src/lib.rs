//! SurrealDB integration for job status collections.
//!
//! This crate provides database connectivity, repositories for status
//! records and collection entries, and [`SurrealStore`], which implements
//! the storage traits from `status_core` on top of them.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod pattern;
mod schema;
mod store;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, connect};
pub use pattern::glob_to_regex;
pub use schema::init_schema;
pub use store::SurrealStore;

/// Connect and initialize the schema.
pub async fn init(config: &DbConfig) -> Result<Database, DbError> {
    let db = connect(config).await?;
    init_schema(&db).await?;
    Ok(db)
}
