use std::sync::Arc;

use actors::{ActorRef, SupervisorMessage, SweepConfig, start_supervisor};
use status_core::{
    Clock, IndexEntry, IndexStore, Jid, Keyspace, ManualClock, RecordKey, SortQuery, SortedRow,
    StatusStore, StoreError,
};

use db::{DbConfig, SurrealStore};

/// Epoch second every test clock starts at.
pub const START: i64 = 1_700_000_000;

pub const WORKER: &str = "CollectionJob";

pub struct Fixture {
    pub store: Arc<SurrealStore>,
    pub clock: ManualClock,
    pub supervisor: ActorRef<SupervisorMessage>,
    pub handle: tokio::task::JoinHandle<()>,
}

/// Start a supervisor over an isolated in-memory store.
pub async fn setup(sweep: SweepConfig) -> Result<Fixture, Box<dyn std::error::Error>> {
    let clock = ManualClock::new(START);
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let store = Arc::new(SurrealStore::open_with_clock(&DbConfig::memory(), shared.clone()).await?);
    let (supervisor, handle) =
        start_supervisor(store.clone(), shared, Keyspace::default(), sweep).await?;
    Ok(Fixture {
        store,
        clock,
        supervisor,
        handle,
    })
}

/// Sweep config without a background ticker.
pub fn manual_sweep() -> SweepConfig {
    SweepConfig::default().with_interval(std::time::Duration::ZERO)
}

impl Fixture {
    pub async fn publish(&self, worker: &str, jid: &str, ttl: u64) -> Result<RecordKey, Box<dyn std::error::Error>> {
        let key = Keyspace::default().record_key(&Jid::new(jid));
        self.store
            .write_status(
                &key,
                [
                    ("worker", worker.to_string()),
                    ("status", "complete".to_string()),
                    ("update_time", START.to_string()),
                ],
                Some(ttl),
            )
            .await?;
        Ok(key)
    }
}

/// Store that refuses every request.
#[derive(Debug, Default)]
pub struct UnreachableStore;

fn refused<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

impl StatusStore for UnreachableStore {
    async fn get_field(&self, _key: &RecordKey, _field: &str) -> Result<Option<String>, StoreError> {
        refused()
    }

    async fn get_fields(
        &self,
        _key: &RecordKey,
        _fields: &[&str],
    ) -> Result<Vec<Option<String>>, StoreError> {
        refused()
    }

    async fn keys_matching(&self, _pattern: &str) -> Result<Vec<RecordKey>, StoreError> {
        refused()
    }

    async fn ttl_remaining(&self, _key: &RecordKey) -> Result<Option<u64>, StoreError> {
        refused()
    }

    async fn delete(&self, _key: &RecordKey) -> Result<u64, StoreError> {
        refused()
    }
}

impl IndexStore for UnreachableStore {
    async fn upsert_entry(&self, _namespace: &str, _entry: &IndexEntry) -> Result<(), StoreError> {
        refused()
    }

    async fn insert_entries(
        &self,
        _namespace: &str,
        _entries: &[IndexEntry],
    ) -> Result<u64, StoreError> {
        refused()
    }

    async fn clear(&self, _namespace: &str) -> Result<(), StoreError> {
        refused()
    }

    async fn remove_entry(&self, _namespace: &str, _member: &RecordKey) -> Result<u64, StoreError> {
        refused()
    }

    async fn remove_range_by_score(
        &self,
        _namespace: &str,
        _max_score: i64,
    ) -> Result<u64, StoreError> {
        refused()
    }

    async fn count_entries(&self, _namespace: &str) -> Result<u64, StoreError> {
        refused()
    }

    async fn entries(&self, _namespace: &str) -> Result<Vec<IndexEntry>, StoreError> {
        refused()
    }

    async fn sort(&self, _namespace: &str, _query: &SortQuery) -> Result<Vec<SortedRow>, StoreError> {
        refused()
    }
}
