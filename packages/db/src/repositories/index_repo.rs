//! Collection entry repository.

use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

/// Collection entry as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRow {
    pub member: String,
    pub score: i64,
}

/// Repository for per-namespace score-ordered entries.
pub struct IndexRepository<'a> {
    db: &'a Database,
}

impl<'a> IndexRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert an entry or update its score.
    pub async fn upsert(&self, namespace: &str, member: &str, score: i64) -> Result<(), DbError> {
        self.db
            .query(
                r#"
                UPSERT type::thing('status_index', [$namespace, $member])
                CONTENT { namespace: $namespace, member: $member, score: $score }
                "#,
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("member", member.to_string()))
            .bind(("score", score))
            .await?
            .check()?;

        Ok(())
    }

    /// Insert or update many entries in a single request.
    pub async fn insert_many(&self, namespace: &str, entries: Vec<EntryRow>) -> Result<u64, DbError> {
        if entries.is_empty() {
            return Ok(0);
        }
        let count = entries.len() as u64;

        self.db
            .query(
                r#"
                FOR $entry IN $entries {
                    UPSERT type::thing('status_index', [$namespace, $entry.member])
                    CONTENT { namespace: $namespace, member: $entry.member, score: $entry.score };
                };
                "#,
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("entries", entries))
            .await?
            .check()?;

        Ok(count)
    }

    /// Delete every entry of a namespace.
    pub async fn clear(&self, namespace: &str) -> Result<(), DbError> {
        self.db
            .query("DELETE status_index WHERE namespace = $namespace")
            .bind(("namespace", namespace.to_string()))
            .await?
            .check()?;

        Ok(())
    }

    /// Delete one entry, returning how many were removed.
    pub async fn remove(&self, namespace: &str, member: &str) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query("DELETE type::thing('status_index', [$namespace, $member]) RETURN BEFORE")
            .bind(("namespace", namespace.to_string()))
            .bind(("member", member.to_string()))
            .await?;

        let removed: Vec<EntryRow> = result.take(0)?;

        Ok(removed.len() as u64)
    }

    /// Delete every entry whose score is at most `max_score`.
    pub async fn remove_up_to(&self, namespace: &str, max_score: i64) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query(
                r#"
                DELETE status_index
                WHERE namespace = $namespace AND score <= $max_score
                RETURN BEFORE
                "#,
            )
            .bind(("namespace", namespace.to_string()))
            .bind(("max_score", max_score))
            .await?;

        let removed: Vec<EntryRow> = result.take(0)?;

        Ok(removed.len() as u64)
    }

    /// Number of entries in a namespace.
    pub async fn count(&self, namespace: &str) -> Result<u64, DbError> {
        #[derive(Deserialize)]
        struct CountRow {
            total: i64,
        }

        let mut result = self
            .db
            .query(
                r#"
                SELECT count() AS total
                FROM status_index
                WHERE namespace = $namespace
                GROUP ALL
                "#,
            )
            .bind(("namespace", namespace.to_string()))
            .await?;

        let rows: Vec<CountRow> = result.take(0)?;

        Ok(rows.first().map(|r| r.total.max(0) as u64).unwrap_or(0))
    }

    /// Entries of a namespace, ascending by score then member.
    pub async fn list(&self, namespace: &str) -> Result<Vec<EntryRow>, DbError> {
        let mut result = self
            .db
            .query(
                r#"
                SELECT member, score
                FROM status_index
                WHERE namespace = $namespace
                ORDER BY score ASC, member ASC
                "#,
            )
            .bind(("namespace", namespace.to_string()))
            .await?;

        let rows: Vec<EntryRow> = result.take(0)?;

        Ok(rows)
    }
}
