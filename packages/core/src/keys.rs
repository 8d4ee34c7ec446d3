//! Key and namespace mapping between workers, jobs and store keys.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Separator between key segments.
pub const SEPARATOR: char = ':';

/// Unique identifier for one job execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jid(String);

impl Jid {
    /// Wrap an existing job identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (lowercase ULID).
    pub fn generate() -> Self {
        Self(Ulid::new().to_string().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Jid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Name of a job type whose executions are tracked by one collection.
///
/// The display form is what status records carry in their `worker` field;
/// the normalized (lowercase) form names the collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerName(String);

impl WorkerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name as written by the status publisher.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive form used for namespacing.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for WorkerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Key of one job's status record in the status store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Job identifier embedded in the key: the suffix after the last separator.
    pub fn jid(&self) -> Jid {
        match self.0.rsplit_once(SEPARATOR) {
            Some((_, jid)) => Jid::new(jid),
            None => Jid::new(self.0.clone()),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Prefixes used to build record keys and collection names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyspace {
    /// Prefix of status record keys (`<status_prefix>:<jid>`).
    pub status_prefix: String,
    /// Prefix of per-worker collections (`<collection_prefix>:<worker>`).
    pub collection_prefix: String,
}

impl Default for Keyspace {
    fn default() -> Self {
        Self {
            status_prefix: "status".to_string(),
            collection_prefix: "statuses_all".to_string(),
        }
    }
}

impl Keyspace {
    /// Set the status record prefix.
    pub fn with_status_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.status_prefix = prefix.into();
        self
    }

    /// Set the collection prefix.
    pub fn with_collection_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.collection_prefix = prefix.into();
        self
    }

    /// Record key for a job.
    pub fn record_key(&self, jid: &Jid) -> RecordKey {
        RecordKey(format!("{}{}{}", self.status_prefix, SEPARATOR, jid))
    }

    /// Glob matching every status record key.
    pub fn status_pattern(&self) -> String {
        format!("{}{}*", self.status_prefix, SEPARATOR)
    }

    /// Collection name for a worker.
    pub fn namespace(&self, worker: &WorkerName) -> String {
        format!("{}{}{}", self.collection_prefix, SEPARATOR, worker.normalized())
    }
}
