//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// This creates the status and collection tables with their indexes.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    db.query(STATUS_SCHEMA).await?.check()?;
    db.query(STATUS_INDEX_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Status record table.
const STATUS_SCHEMA: &str = r#"
-- One record per job status hash, keyed by the record key
DEFINE TABLE IF NOT EXISTS status SCHEMALESS;

DEFINE FIELD IF NOT EXISTS key ON status TYPE string;
DEFINE FIELD IF NOT EXISTS fields ON status TYPE object DEFAULT {};
DEFINE FIELD IF NOT EXISTS expires_at ON status TYPE option<int>;

DEFINE INDEX IF NOT EXISTS status_key ON status FIELDS key UNIQUE;
DEFINE INDEX IF NOT EXISTS status_expires ON status FIELDS expires_at;
"#;

/// Per-worker collection table.
const STATUS_INDEX_SCHEMA: &str = r#"
-- One record per (namespace, member); score is the expiration epoch second
DEFINE TABLE IF NOT EXISTS status_index SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS namespace ON status_index TYPE string;
DEFINE FIELD IF NOT EXISTS member ON status_index TYPE string;
DEFINE FIELD IF NOT EXISTS score ON status_index TYPE int;

DEFINE INDEX IF NOT EXISTS status_index_namespace ON status_index FIELDS namespace;
DEFINE INDEX IF NOT EXISTS status_index_score ON status_index FIELDS namespace, score;
"#;
