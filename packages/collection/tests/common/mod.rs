use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use status_collection::CollectionIndex;
use status_core::{
    Clock, IndexEntry, IndexStore, Jid, Keyspace, ManualClock, RecordKey, SortQuery, SortedRow,
    StatusStore, StoreError,
};

use db::{DbConfig, DbError, SurrealStore};

/// Epoch second every test clock starts at.
pub const START: i64 = 1_700_000_000;

pub const WORKER: &str = "CollectionJob";

pub struct Fixture {
    pub store: Arc<SurrealStore>,
    pub clock: ManualClock,
    pub index: CollectionIndex<SurrealStore>,
}

/// Open an isolated in-memory store and an index for [`WORKER`].
pub async fn setup() -> Result<Fixture, DbError> {
    let clock = ManualClock::new(START);
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let store = Arc::new(SurrealStore::open_with_clock(&DbConfig::memory(), shared.clone()).await?);
    let index = CollectionIndex::new(store.clone(), WORKER)
        .with_keyspace(Keyspace::default())
        .with_clock(shared);
    Ok(Fixture {
        store,
        clock,
        index,
    })
}

impl Fixture {
    /// Publish a status record the way a job-running process would.
    pub async fn publish(
        &self,
        worker: &str,
        jid: &str,
        status: &str,
        update_time: i64,
        ttl: Option<u64>,
    ) -> Result<RecordKey, DbError> {
        let key = self.index.record_key(&Jid::new(jid));
        self.store
            .write_status(
                &key,
                [
                    ("worker", worker.to_string()),
                    ("status", status.to_string()),
                    ("update_time", update_time.to_string()),
                    ("args", String::new()),
                ],
                ttl,
            )
            .await?;
        Ok(key)
    }
}

/// Store whose every request fails as if the server were unreachable.
#[derive(Debug, Default)]
pub struct UnreachableStore {
    requests: AtomicUsize,
}

impl UnreachableStore {
    /// Requests attempted so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn refuse<T>(&self) -> Result<T, StoreError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

impl StatusStore for UnreachableStore {
    async fn get_field(&self, _key: &RecordKey, _field: &str) -> Result<Option<String>, StoreError> {
        self.refuse()
    }

    async fn get_fields(
        &self,
        _key: &RecordKey,
        _fields: &[&str],
    ) -> Result<Vec<Option<String>>, StoreError> {
        self.refuse()
    }

    async fn keys_matching(&self, _pattern: &str) -> Result<Vec<RecordKey>, StoreError> {
        self.refuse()
    }

    async fn ttl_remaining(&self, _key: &RecordKey) -> Result<Option<u64>, StoreError> {
        self.refuse()
    }

    async fn delete(&self, _key: &RecordKey) -> Result<u64, StoreError> {
        self.refuse()
    }
}

impl IndexStore for UnreachableStore {
    async fn upsert_entry(&self, _namespace: &str, _entry: &IndexEntry) -> Result<(), StoreError> {
        self.refuse()
    }

    async fn insert_entries(
        &self,
        _namespace: &str,
        _entries: &[IndexEntry],
    ) -> Result<u64, StoreError> {
        self.refuse()
    }

    async fn clear(&self, _namespace: &str) -> Result<(), StoreError> {
        self.refuse()
    }

    async fn remove_entry(&self, _namespace: &str, _member: &RecordKey) -> Result<u64, StoreError> {
        self.refuse()
    }

    async fn remove_range_by_score(
        &self,
        _namespace: &str,
        _max_score: i64,
    ) -> Result<u64, StoreError> {
        self.refuse()
    }

    async fn count_entries(&self, _namespace: &str) -> Result<u64, StoreError> {
        self.refuse()
    }

    async fn entries(&self, _namespace: &str) -> Result<Vec<IndexEntry>, StoreError> {
        self.refuse()
    }

    async fn sort(&self, _namespace: &str, _query: &SortQuery) -> Result<Vec<SortedRow>, StoreError> {
        self.refuse()
    }
}
