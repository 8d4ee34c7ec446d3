//! Per-worker collections of job status records.
//!
//! A [`CollectionIndex`] tracks which status records exist for one worker
//! and when each expires, so recent jobs can be listed, paginated, counted
//! and pruned without scanning the whole status store.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use db::{DbConfig, SurrealStore};
//! use status_collection::CollectionIndex;
//!
//! let store = Arc::new(SurrealStore::open(&DbConfig::memory()).await?);
//! let index = CollectionIndex::new(store, "CollectionJob");
//!
//! index.refresh_collection().await?;
//! let recent = index.sorted_keys(1, 10)?.to_vec().await?;
//! ```

mod index;
mod sorted;

pub use index::CollectionIndex;
pub use sorted::SortedKeys;
