//! Core types for per-worker job status collections.
//!
//! This crate contains shared types used across all packages:
//! - Key and namespace mapping between workers, jobs and store keys
//! - Index entries and projected records
//! - Storage capability traits implemented by backends
//! - Clocks and lifecycle events

mod clock;
mod error;
mod events;
mod keys;
mod record;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{IndexError, StoreError};
pub use events::StatusEvent;
pub use keys::{Jid, Keyspace, RecordKey, SEPARATOR, WorkerName};
pub use record::{
    ARGS_FIELD, DISPLAY_FIELDS, EntryState, IndexEntry, Page, ProjectedRecord, STATUS_FIELD,
    UPDATE_TIME_FIELD, WORKER_FIELD,
};
pub use store::{IndexStore, SortOrder, SortQuery, SortedRow, StatusStore};
