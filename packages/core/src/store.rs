//! Capabilities a backing store must offer to host collections.
//!
//! Status records and collections usually live in the same key-value store,
//! but they are described separately: the status side is owned by whoever
//! publishes job statuses, the index side is owned by the collection.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::keys::RecordKey;
use crate::record::IndexEntry;

/// Read/delete access to job status records.
pub trait StatusStore: Send + Sync {
    /// Value of one field, `None` if the record or field is absent.
    fn get_field(
        &self,
        key: &RecordKey,
        field: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Values of several fields of one record, in the order requested.
    fn get_fields(
        &self,
        key: &RecordKey,
        fields: &[&str],
    ) -> impl Future<Output = Result<Vec<Option<String>>, StoreError>> + Send;

    /// Keys of live records matching a glob pattern.
    fn keys_matching(
        &self,
        pattern: &str,
    ) -> impl Future<Output = Result<Vec<RecordKey>, StoreError>> + Send;

    /// Seconds until the record expires; `None` if it is absent or never expires.
    fn ttl_remaining(
        &self,
        key: &RecordKey,
    ) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send;

    /// Delete a record, returning how many were removed (0 or 1).
    fn delete(&self, key: &RecordKey) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Score-ordered sets of record keys, one per namespace.
pub trait IndexStore: Send + Sync {
    /// Insert the entry or update its score.
    fn upsert_entry(
        &self,
        namespace: &str,
        entry: &IndexEntry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert or update many entries in one request.
    fn insert_entries(
        &self,
        namespace: &str,
        entries: &[IndexEntry],
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Drop every entry of the namespace.
    fn clear(&self, namespace: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove one member, returning 0 or 1.
    fn remove_entry(
        &self,
        namespace: &str,
        member: &RecordKey,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Remove every entry with `score <= max_score`.
    fn remove_range_by_score(
        &self,
        namespace: &str,
        max_score: i64,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn count_entries(&self, namespace: &str)
    -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// All entries, ascending by score.
    fn entries(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<IndexEntry>, StoreError>> + Send;

    /// Order members by a field of their status records and project fields.
    ///
    /// Implementations must order exactly like [`sort_rows`].
    fn sort(
        &self,
        namespace: &str,
        query: &SortQuery,
    ) -> impl Future<Output = Result<Vec<SortedRow>, StoreError>> + Send;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Sort-and-project request over one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortQuery {
    /// Status field to order by, compared numerically.
    pub by: String,
    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
    /// Status fields to return for every selected member.
    pub get: Vec<String>,
}

/// One member selected by a [`SortQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedRow {
    pub member: RecordKey,
    /// Values of [`SortQuery::get`], `None` where missing.
    pub values: Vec<Option<String>>,
}

/// Reference sort used by every backend.
///
/// Entries are first put in native order (score, then member). The sort
/// field is parsed as a number; missing or non-numeric values count as 0.
/// Sorting is stable, so ties keep native order.
pub fn sort_rows<F>(mut entries: Vec<IndexEntry>, query: &SortQuery, lookup: F) -> Vec<SortedRow>
where
    F: Fn(&RecordKey, &str) -> Option<String>,
{
    entries.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.member.cmp(&b.member)));

    let mut keyed: Vec<(f64, RecordKey)> = entries
        .into_iter()
        .map(|entry| {
            let weight = lookup(&entry.member, &query.by)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| !v.is_nan())
                .unwrap_or(0.0);
            (weight, entry.member)
        })
        .collect();

    match query.order {
        SortOrder::Asc => keyed.sort_by(|a, b| a.0.total_cmp(&b.0)),
        SortOrder::Desc => keyed.sort_by(|a, b| b.0.total_cmp(&a.0)),
    }

    keyed
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .map(|(_, member)| {
            let values = query.get.iter().map(|field| lookup(&member, field)).collect();
            SortedRow { member, values }
        })
        .collect()
}
