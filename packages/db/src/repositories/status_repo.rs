//! Status record repository.
//!
//! Status records are hash-like: a flat map of string fields plus an
//! optional expiration. Records whose expiration has passed are treated
//! as absent by every read, and are physically removed by
//! [`StatusRepository::purge_expired`] or the next write to the same key.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

/// Status record as stored; the record id is derived from `key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub key: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl StatusRecord {
    /// Whether the record is still visible at `now`.
    pub fn is_live(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Repository for status record persistence.
pub struct StatusRepository<'a> {
    db: &'a Database,
}

impl<'a> StatusRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a live record by key.
    pub async fn get(&self, key: &str, now: i64) -> Result<Option<StatusRecord>, DbError> {
        let mut result = self
            .db
            .query("SELECT key, fields, expires_at FROM type::thing('status', $key)")
            .bind(("key", key.to_string()))
            .await?;

        let records: Vec<StatusRecord> = result.take(0)?;

        Ok(records.into_iter().find(|r| r.is_live(now)))
    }

    /// Fields of every live record among `keys`, keyed by record key.
    pub async fn get_many(
        &self,
        keys: &[String],
        now: i64,
    ) -> Result<HashMap<String, BTreeMap<String, String>>, DbError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut result = self
            .db
            .query("SELECT key, fields, expires_at FROM status WHERE key IN $keys")
            .bind(("keys", keys.to_vec()))
            .await?;

        let records: Vec<StatusRecord> = result.take(0)?;

        Ok(records
            .into_iter()
            .filter(|r| r.is_live(now))
            .map(|r| (r.key, r.fields))
            .collect())
    }

    /// Keys of every live record.
    pub async fn keys(&self, now: i64) -> Result<Vec<String>, DbError> {
        #[derive(Deserialize)]
        struct KeyRow {
            key: String,
            #[serde(default)]
            expires_at: Option<i64>,
        }

        let mut result = self
            .db
            .query("SELECT key, expires_at FROM status ORDER BY key ASC")
            .await?;

        let rows: Vec<KeyRow> = result.take(0)?;

        Ok(rows
            .into_iter()
            .filter(|r| r.expires_at.is_none_or(|at| at > now))
            .map(|r| r.key)
            .collect())
    }

    /// Set fields on a record, creating it if needed.
    ///
    /// With `ttl` the record expires `ttl` seconds after `now`; without it
    /// the current expiration is left untouched.
    pub async fn write(
        &self,
        key: &str,
        fields: BTreeMap<String, String>,
        ttl: Option<u64>,
        now: i64,
    ) -> Result<(), DbError> {
        // An expired record must not leak its old fields into the new one
        self.db
            .query(
                "DELETE type::thing('status', $key) WHERE expires_at != NONE AND expires_at <= $now",
            )
            .bind(("key", key.to_string()))
            .bind(("now", now))
            .await?
            .check()?;

        let mut data = serde_json::json!({
            "key": key,
            "fields": fields,
        });
        if let Some(ttl) = ttl {
            let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
            data["expires_at"] = serde_json::json!(now.saturating_add(ttl));
        }

        self.db
            .query("UPSERT type::thing('status', $key) MERGE $data")
            .bind(("key", key.to_string()))
            .bind(("data", data))
            .await?
            .check()?;

        tracing::debug!("Wrote status record {}", key);
        Ok(())
    }

    /// Reset the expiration of a live record. Returns false if it is absent.
    pub async fn expire(&self, key: &str, ttl: u64, now: i64) -> Result<bool, DbError> {
        if self.get(key, now).await?.is_none() {
            return Ok(false);
        }
        let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);

        self.db
            .query("UPDATE type::thing('status', $key) SET expires_at = $expires_at")
            .bind(("key", key.to_string()))
            .bind(("expires_at", now.saturating_add(ttl)))
            .await?
            .check()?;

        Ok(true)
    }

    /// Delete a record, returning 1 if a live record was removed.
    pub async fn delete(&self, key: &str, now: i64) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query("DELETE type::thing('status', $key) RETURN BEFORE")
            .bind(("key", key.to_string()))
            .await?;

        let removed: Vec<StatusRecord> = result.take(0)?;

        Ok(removed.iter().filter(|r| r.is_live(now)).count() as u64)
    }

    /// Physically remove every expired record.
    pub async fn purge_expired(&self, now: i64) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query("DELETE status WHERE expires_at != NONE AND expires_at <= $now RETURN BEFORE")
            .bind(("now", now))
            .await?;

        let removed: Vec<StatusRecord> = result.take(0)?;

        if !removed.is_empty() {
            tracing::debug!("Purged {} expired status records", removed.len());
        }

        Ok(removed.len() as u64)
    }
}
