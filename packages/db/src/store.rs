//! Storage traits implemented on SurrealDB.

use std::collections::BTreeMap;
use std::sync::Arc;

use status_core::store::sort_rows;
use status_core::{
    Clock, IndexEntry, IndexStore, RecordKey, SortQuery, SortedRow, StatusStore, StoreError,
    SystemClock,
};

use crate::repositories::{EntryRow, IndexRepository, StatusRepository};
use crate::{Database, DbConfig, DbError, glob_to_regex};

/// Status store and collection storage backed by one SurrealDB database.
///
/// Expiration is evaluated against the injected clock, so records and
/// collection entries age consistently with the collections that use it.
#[derive(Clone)]
pub struct SurrealStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl SurrealStore {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Connect, initialize the schema and use the wall clock.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        Self::open_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Connect and initialize the schema with an explicit clock.
    pub async fn open_with_clock(config: &DbConfig, clock: Arc<dyn Clock>) -> Result<Self, DbError> {
        let db = crate::init(config).await?;
        Ok(Self::new(db, clock))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn statuses(&self) -> StatusRepository<'_> {
        StatusRepository::new(&self.db)
    }

    pub fn index(&self) -> IndexRepository<'_> {
        IndexRepository::new(&self.db)
    }

    /// Publish status fields for a record, as a job-running process would.
    pub async fn write_status<K, V>(
        &self,
        key: &RecordKey,
        fields: impl IntoIterator<Item = (K, V)>,
        ttl: Option<u64>,
    ) -> Result<(), DbError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields: BTreeMap<String, String> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.statuses()
            .write(key.as_str(), fields, ttl, self.clock.now())
            .await
    }

    /// Reset a record's expiration. Returns false if it does not exist.
    pub async fn expire(&self, key: &RecordKey, ttl: u64) -> Result<bool, DbError> {
        self.statuses()
            .expire(key.as_str(), ttl, self.clock.now())
            .await
    }

    /// Physically remove expired status records.
    pub async fn purge_expired(&self) -> Result<u64, DbError> {
        self.statuses().purge_expired(self.clock.now()).await
    }
}

impl std::fmt::Debug for SurrealStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealStore").finish_non_exhaustive()
    }
}

impl StatusStore for SurrealStore {
    async fn get_field(&self, key: &RecordKey, field: &str) -> Result<Option<String>, StoreError> {
        let record = self.statuses().get(key.as_str(), self.clock.now()).await?;
        Ok(record.and_then(|mut r| r.fields.remove(field)))
    }

    async fn get_fields(
        &self,
        key: &RecordKey,
        fields: &[&str],
    ) -> Result<Vec<Option<String>>, StoreError> {
        let record = self.statuses().get(key.as_str(), self.clock.now()).await?;
        Ok(fields
            .iter()
            .map(|field| record.as_ref().and_then(|r| r.fields.get(*field).cloned()))
            .collect())
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<RecordKey>, StoreError> {
        let matcher = glob_to_regex(pattern).map_err(DbError::from)?;
        let keys = self.statuses().keys(self.clock.now()).await?;
        Ok(keys
            .into_iter()
            .filter(|k| matcher.is_match(k))
            .map(RecordKey::from)
            .collect())
    }

    async fn ttl_remaining(&self, key: &RecordKey) -> Result<Option<u64>, StoreError> {
        let now = self.clock.now();
        let record = self.statuses().get(key.as_str(), now).await?;
        Ok(record
            .and_then(|r| r.expires_at)
            .map(|at| (at - now).max(0) as u64))
    }

    async fn delete(&self, key: &RecordKey) -> Result<u64, StoreError> {
        Ok(self.statuses().delete(key.as_str(), self.clock.now()).await?)
    }
}

impl IndexStore for SurrealStore {
    async fn upsert_entry(&self, namespace: &str, entry: &IndexEntry) -> Result<(), StoreError> {
        Ok(self
            .index()
            .upsert(namespace, entry.member.as_str(), entry.score)
            .await?)
    }

    async fn insert_entries(
        &self,
        namespace: &str,
        entries: &[IndexEntry],
    ) -> Result<u64, StoreError> {
        let rows = entries
            .iter()
            .map(|e| EntryRow {
                member: e.member.to_string(),
                score: e.score,
            })
            .collect();
        Ok(self.index().insert_many(namespace, rows).await?)
    }

    async fn clear(&self, namespace: &str) -> Result<(), StoreError> {
        Ok(self.index().clear(namespace).await?)
    }

    async fn remove_entry(&self, namespace: &str, member: &RecordKey) -> Result<u64, StoreError> {
        Ok(self.index().remove(namespace, member.as_str()).await?)
    }

    async fn remove_range_by_score(
        &self,
        namespace: &str,
        max_score: i64,
    ) -> Result<u64, StoreError> {
        Ok(self.index().remove_up_to(namespace, max_score).await?)
    }

    async fn count_entries(&self, namespace: &str) -> Result<u64, StoreError> {
        Ok(self.index().count(namespace).await?)
    }

    async fn entries(&self, namespace: &str) -> Result<Vec<IndexEntry>, StoreError> {
        let rows = self.index().list(namespace).await?;
        Ok(rows
            .into_iter()
            .map(|r| IndexEntry::new(r.member, r.score))
            .collect())
    }

    async fn sort(&self, namespace: &str, query: &SortQuery) -> Result<Vec<SortedRow>, StoreError> {
        let now = self.clock.now();
        let entries = IndexStore::entries(self, namespace).await?;
        let keys: Vec<String> = entries.iter().map(|e| e.member.to_string()).collect();
        let records = self.statuses().get_many(&keys, now).await?;

        Ok(sort_rows(entries, query, |member, field| {
            records
                .get(member.as_str())
                .and_then(|fields| fields.get(field))
                .cloned()
        }))
    }
}
