//! Repository implementations for database operations.

mod index_repo;
mod status_repo;

pub use index_repo::{EntryRow, IndexRepository};
pub use status_repo::{StatusRecord, StatusRepository};
