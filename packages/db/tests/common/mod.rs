use std::sync::Arc;

use status_core::ManualClock;

use db::{DbConfig, DbError, SurrealStore};

/// Epoch second every test clock starts at.
pub const START: i64 = 1_700_000_000;

/// Open an isolated in-memory store driven by a manual clock.
pub async fn setup_store() -> Result<(SurrealStore, ManualClock), DbError> {
    let clock = ManualClock::new(START);
    let store = SurrealStore::open_with_clock(&DbConfig::memory(), Arc::new(clock.clone())).await?;
    Ok((store, clock))
}
