//! Job lifecycle events that drive collection membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{Jid, WorkerName};

/// Events emitted by status publishers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StatusEvent {
    /// A job wrote (or rewrote) its status record.
    Published {
        worker: WorkerName,
        jid: Jid,
        status: String,
        /// Expiration of the status record, in seconds from now.
        ttl_secs: u64,
        timestamp: DateTime<Utc>,
    },
    /// A job's status record was deleted.
    Deleted {
        worker: WorkerName,
        jid: Jid,
        timestamp: DateTime<Utc>,
    },
    /// A job was cancelled and its status should no longer be listed.
    Cancelled {
        worker: WorkerName,
        jid: Jid,
        reason: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl StatusEvent {
    /// A status publication happening now.
    pub fn published(
        worker: impl Into<WorkerName>,
        jid: Jid,
        status: impl Into<String>,
        ttl_secs: u64,
    ) -> Self {
        StatusEvent::Published {
            worker: worker.into(),
            jid,
            status: status.into(),
            ttl_secs,
            timestamp: Utc::now(),
        }
    }

    /// A deletion happening now.
    pub fn deleted(worker: impl Into<WorkerName>, jid: Jid) -> Self {
        StatusEvent::Deleted {
            worker: worker.into(),
            jid,
            timestamp: Utc::now(),
        }
    }

    /// A cancellation happening now.
    pub fn cancelled(worker: impl Into<WorkerName>, jid: Jid, reason: Option<String>) -> Self {
        StatusEvent::Cancelled {
            worker: worker.into(),
            jid,
            reason,
            timestamp: Utc::now(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            StatusEvent::Published { timestamp, .. } => *timestamp,
            StatusEvent::Deleted { timestamp, .. } => *timestamp,
            StatusEvent::Cancelled { timestamp, .. } => *timestamp,
        }
    }

    pub fn worker(&self) -> &WorkerName {
        match self {
            StatusEvent::Published { worker, .. } => worker,
            StatusEvent::Deleted { worker, .. } => worker,
            StatusEvent::Cancelled { worker, .. } => worker,
        }
    }

    pub fn jid(&self) -> &Jid {
        match self {
            StatusEvent::Published { jid, .. } => jid,
            StatusEvent::Deleted { jid, .. } => jid,
            StatusEvent::Cancelled { jid, .. } => jid,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            StatusEvent::Published {
                worker,
                jid,
                status,
                ttl_secs,
                ..
            } => format!("{} job {} -> {} (ttl {}s)", worker, jid, status, ttl_secs),
            StatusEvent::Deleted { worker, jid, .. } => format!("{} job {} deleted", worker, jid),
            StatusEvent::Cancelled {
                worker, jid, reason, ..
            } => {
                let reason = reason.as_deref().unwrap_or("no reason");
                format!("{} job {} cancelled: {}", worker, jid, reason)
            }
        }
    }
}
