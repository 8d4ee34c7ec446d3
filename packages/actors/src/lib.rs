//! Actor system for collection maintenance.
//!
//! This crate provides the Ractor-based actors that keep per-worker
//! collections current in the background.
//!
//! # Architecture
//!
//! - `CollectionSupervisor` - Top-level actor that routes lifecycle events
//! - `CollectionActor` - Owns one worker's collection, prunes it on a tick
//!   and rebuilds it on a schedule or on request
//!
//! # Usage
//!
//! ```ignore
//! use actors::{SweepConfig, collection, start_supervisor};
//!
//! let (supervisor, handle) =
//!     start_supervisor(store, clock, Keyspace::default(), SweepConfig::default()).await?;
//!
//! supervisor.send_message(SupervisorMessage::Track { event })?;
//! let recent = collection(&supervisor, "CollectionJob").await?.page(Page::default()).await?;
//! ```

mod collection_actor;
mod handle;
mod messages;
mod supervisor;

pub use collection_actor::{CollectionActor, CollectionActorState, SweepConfig};
pub use handle::{CollectionHandle, DEFAULT_TIMEOUT, collection, list_collections};
pub use messages::{ActorError, CollectionMessage, SupervisorMessage};
pub use supervisor::{CollectionSupervisor, SupervisorArgs, SupervisorState, start_supervisor};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
