//! Per-worker collection of status record keys scored by expiration.

use std::sync::Arc;

use status_core::{
    Clock, EntryState, IndexEntry, IndexError, IndexStore, Jid, Keyspace, Page, RecordKey,
    StatusEvent, StatusStore, SystemClock, WORKER_FIELD, WorkerName,
};

use crate::sorted::SortedKeys;

/// Secondary index over one worker's status records.
///
/// Every entry maps a record key to the expiration that was known when the
/// entry was last written. The index is never updated behind the caller's
/// back: an extended record TTL only shows up after the next [`add`] or
/// [`refresh_collection`].
///
/// [`add`]: CollectionIndex::add
/// [`refresh_collection`]: CollectionIndex::refresh_collection
pub struct CollectionIndex<S> {
    store: Arc<S>,
    worker: WorkerName,
    keyspace: Keyspace,
    namespace: String,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for CollectionIndex<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            worker: self.worker.clone(),
            keyspace: self.keyspace.clone(),
            namespace: self.namespace.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<S> std::fmt::Debug for CollectionIndex<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionIndex")
            .field("worker", &self.worker)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<S> CollectionIndex<S>
where
    S: StatusStore + IndexStore,
{
    /// Create an index for `worker` using the default keyspace and the wall clock.
    pub fn new(store: Arc<S>, worker: impl Into<WorkerName>) -> Self {
        let worker = worker.into();
        let keyspace = Keyspace::default();
        Self {
            namespace: keyspace.namespace(&worker),
            store,
            worker,
            keyspace,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different keyspace.
    pub fn with_keyspace(mut self, keyspace: Keyspace) -> Self {
        self.namespace = keyspace.namespace(&self.worker);
        self.keyspace = keyspace;
        self
    }

    /// Use a different clock for scores and expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn worker(&self) -> &WorkerName {
        &self.worker
    }

    /// Name of the backing collection.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record key for one of this worker's jobs.
    pub fn record_key(&self, jid: &Jid) -> RecordKey {
        self.keyspace.record_key(jid)
    }

    /// Rebuild the collection from the status store.
    ///
    /// Scans every status record, keeps those published by this worker (any
    /// letter case, like the namespace) that carry an expiration, then clears the collection and inserts them with
    /// `score = now + remaining ttl`. Clear and insert are separate requests;
    /// a concurrent [`add`](Self::add) may be lost until the next refresh.
    pub async fn refresh_collection(&self) -> Result<u64, IndexError> {
        let pattern = self.keyspace.status_pattern();
        let candidates = self.store.keys_matching(&pattern).await?;
        let now = self.clock.now();
        let wanted = self.worker.normalized();

        let mut entries = Vec::new();
        for key in candidates {
            let worker = self.store.get_field(&key, WORKER_FIELD).await?;
            if !worker.is_some_and(|w| w.to_lowercase() == wanted) {
                continue;
            }

            match self.store.ttl_remaining(&key).await? {
                Some(ttl) => {
                    let score = now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX));
                    entries.push(IndexEntry::new(key, score));
                }
                None => tracing::debug!("Skipping {} without expiration", key),
            }
        }

        self.store.clear(&self.namespace).await?;
        if entries.is_empty() {
            tracing::info!("Refreshed {}: empty", self.namespace);
            return Ok(0);
        }

        let inserted = self.store.insert_entries(&self.namespace, &entries).await?;
        tracing::info!("Refreshed {}: {} entries", self.namespace, inserted);

        Ok(inserted)
    }

    /// Insert a key, or move its expiration to `now + ttl_secs`.
    pub async fn add(&self, key: &RecordKey, ttl_secs: u64) -> Result<(), IndexError> {
        let score = self
            .clock
            .now()
            .saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX));

        self.store
            .upsert_entry(&self.namespace, &IndexEntry::new(key.clone(), score))
            .await?;

        tracing::debug!("Added {} to {} (expires at {})", key, self.namespace, score);
        Ok(())
    }

    /// Remove a key. Returns 1 if it was present, 0 otherwise.
    pub async fn remove(&self, key: &RecordKey) -> Result<u64, IndexError> {
        let removed = self.store.remove_entry(&self.namespace, key).await?;
        tracing::debug!("Removed {} from {}: {}", key, self.namespace, removed);
        Ok(removed)
    }

    /// Remove every entry whose expiration is at or before now.
    ///
    /// Only entries scored at or below the instant read here are touched, so
    /// entries added concurrently with a future expiration survive.
    pub async fn remove_expired(&self) -> Result<u64, IndexError> {
        let now = self.clock.now();
        let removed = self
            .store
            .remove_range_by_score(&self.namespace, now)
            .await?;

        if removed > 0 {
            tracing::debug!("Pruned {} expired entries from {}", removed, self.namespace);
        }

        Ok(removed)
    }

    /// Number of entries in the collection.
    pub async fn total(&self) -> Result<u64, IndexError> {
        Ok(self.store.count_entries(&self.namespace).await?)
    }

    /// Raw entries, ascending by expiration, with their state at now.
    pub async fn entries(&self) -> Result<Vec<(IndexEntry, EntryState)>, IndexError> {
        let now = self.clock.now();
        let entries = self.store.entries(&self.namespace).await?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let state = entry.state(now);
                (entry, state)
            })
            .collect())
    }

    /// Most recently updated records, one page at a time.
    ///
    /// Arguments are validated here; the store is only queried when the
    /// returned sequence is read.
    pub fn sorted_keys(&self, page: usize, per_page: usize) -> Result<SortedKeys<S>, IndexError> {
        if page < 1 {
            return Err(IndexError::InvalidArgument(format!(
                "page must be at least 1, got {}",
                page
            )));
        }
        if per_page < 1 {
            return Err(IndexError::InvalidArgument(format!(
                "per_page must be at least 1, got {}",
                per_page
            )));
        }

        Ok(SortedKeys::new(
            self.store.clone(),
            self.namespace.clone(),
            self.worker.to_string(),
            Page::new(page, per_page),
        ))
    }

    /// Same as [`sorted_keys`](Self::sorted_keys) with a [`Page`].
    pub fn all(&self, page: Page) -> Result<SortedKeys<S>, IndexError> {
        self.sorted_keys(page.page, page.per_page)
    }

    /// Apply a lifecycle event. Events for other workers are ignored.
    ///
    /// Returns whether the event belonged to this collection.
    pub async fn track(&self, event: &StatusEvent) -> Result<bool, IndexError> {
        if event.worker().normalized() != self.worker.normalized() {
            return Ok(false);
        }

        let key = self.record_key(event.jid());
        match event {
            StatusEvent::Published { ttl_secs, .. } => self.add(&key, *ttl_secs).await?,
            StatusEvent::Deleted { .. } | StatusEvent::Cancelled { .. } => {
                self.remove(&key).await?;
            }
        }

        Ok(true)
    }

    /// Delete a job's status record and drop it from the collection.
    ///
    /// Returns how many status records were deleted (0 or 1).
    pub async fn delete_status(&self, jid: &Jid) -> Result<u64, IndexError> {
        let key = self.record_key(jid);
        let deleted = self.store.delete(&key).await?;
        self.remove(&key).await?;
        Ok(deleted)
    }
}
