//! Index entries and the records projected from them.

use serde::{Deserialize, Serialize};

use crate::keys::{Jid, RecordKey};

/// Status record field holding the worker name that published it.
pub const WORKER_FIELD: &str = "worker";
/// Status record field holding the last update time (epoch seconds).
pub const UPDATE_TIME_FIELD: &str = "update_time";
/// Status record field holding the job status.
pub const STATUS_FIELD: &str = "status";
/// Status record field holding the serialized job arguments.
pub const ARGS_FIELD: &str = "args";

/// Fields fetched for every projected record, in projection order.
pub const DISPLAY_FIELDS: [&str; 3] = [UPDATE_TIME_FIELD, STATUS_FIELD, ARGS_FIELD];

/// One member of a worker's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Key of the referenced status record.
    pub member: RecordKey,
    /// Expiration known when the entry was last written, in epoch seconds.
    pub score: i64,
}

impl IndexEntry {
    pub fn new(member: impl Into<RecordKey>, score: i64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }

    /// Lifecycle state relative to `now`.
    pub fn state(&self, now: i64) -> EntryState {
        if self.score <= now {
            EntryState::Expired
        } else {
            EntryState::Active
        }
    }
}

/// Observable state of an entry still present in the collection.
///
/// Removed entries are simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Expiration lies in the future.
    Active,
    /// Expiration has passed; eligible for pruning.
    Expired,
}

/// A collection member joined with live fields from its status record.
///
/// Fields are `None` when the status record is gone or lacks the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedRecord {
    pub jid: Jid,
    pub worker: String,
    pub update_time: Option<String>,
    pub status: Option<String>,
    pub args: Option<String>,
}

impl ProjectedRecord {
    /// Build a record from a member key and values ordered like [`DISPLAY_FIELDS`].
    pub fn from_values(member: &RecordKey, worker: &str, values: Vec<Option<String>>) -> Self {
        let mut values = values.into_iter();
        Self {
            jid: member.jid(),
            worker: worker.to_string(),
            update_time: values.next().flatten(),
            status: values.next().flatten(),
            args: values.next().flatten(),
        }
    }

    /// Whether the backing record was missing when this was read.
    pub fn is_empty(&self) -> bool {
        self.update_time.is_none() && self.status.is_none() && self.args.is_none()
    }
}

/// Pagination window for sorted reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub page: usize,
    /// Records per page.
    pub per_page: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl Page {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Number of members skipped before this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> usize {
        self.per_page
    }
}
