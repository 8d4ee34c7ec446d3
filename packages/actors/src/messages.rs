//! Message types for actor communication.

use ractor::{ActorRef, RpcReplyPort};
use status_core::{IndexError, Jid, Page, ProjectedRecord, StatusEvent, WorkerName};

/// Messages for the CollectionActor.
#[derive(Debug)]
pub enum CollectionMessage {
    /// Apply a lifecycle event to the collection.
    Track { event: StatusEvent },

    /// Rebuild the collection from the status store.
    Refresh {
        reply: RpcReplyPort<Result<u64, IndexError>>,
    },

    /// Prune expired entries now.
    RemoveExpired {
        reply: RpcReplyPort<Result<u64, IndexError>>,
    },

    /// Get the number of entries.
    Total {
        reply: RpcReplyPort<Result<u64, IndexError>>,
    },

    /// Read one page of recent records.
    Page {
        page: Page,
        reply: RpcReplyPort<Result<Vec<ProjectedRecord>, IndexError>>,
    },

    /// Delete a job's status and its entry.
    DeleteStatus {
        jid: Jid,
        reply: RpcReplyPort<Result<u64, IndexError>>,
    },

    /// Periodic tick for housekeeping.
    Tick,

    /// Stop the actor.
    Shutdown,
}

/// Messages for the CollectionSupervisor.
#[derive(Debug)]
pub enum SupervisorMessage {
    /// Route a lifecycle event to its worker's collection.
    Track { event: StatusEvent },

    /// Get (spawning if needed) the collection actor for a worker.
    GetCollection {
        worker: WorkerName,
        reply: RpcReplyPort<ActorRef<CollectionMessage>>,
    },

    /// List namespaces with a running collection actor.
    ListCollections { reply: RpcReplyPort<Vec<String>> },

    /// Shutdown all collections.
    Shutdown,
}

/// Error type for actor operations.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("Collection error: {0}")]
    Index(#[from] IndexError),

    #[error("Actor error: {0}")]
    Actor(String),

    #[error("Timeout")]
    Timeout,
}
