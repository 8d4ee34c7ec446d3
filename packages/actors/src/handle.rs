//! Request/response helpers over collection actors.

use std::time::Duration;

use ractor::rpc::{CallResult, call};
use ractor::{ActorRef, RpcReplyPort};
use status_core::{IndexError, Jid, Page, ProjectedRecord, StatusEvent, WorkerName};

use crate::messages::{ActorError, CollectionMessage, SupervisorMessage};

/// Default time to wait for an actor reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

async fn ask<M, T>(
    actor: &ActorRef<M>,
    build: impl FnOnce(RpcReplyPort<T>) -> M,
    timeout: Duration,
) -> Result<T, ActorError>
where
    M: ractor::Message,
    T: Send + 'static,
{
    match call(actor, build, Some(timeout)).await {
        Ok(CallResult::Success(value)) => Ok(value),
        Ok(CallResult::Timeout) => Err(ActorError::Timeout),
        Ok(CallResult::SenderError) => Err(ActorError::Actor("reply dropped".into())),
        Err(e) => Err(ActorError::Actor(e.to_string())),
    }
}

/// Typed client for one collection actor.
#[derive(Debug, Clone)]
pub struct CollectionHandle {
    actor: ActorRef<CollectionMessage>,
    timeout: Duration,
}

impl CollectionHandle {
    pub fn new(actor: ActorRef<CollectionMessage>) -> Self {
        Self {
            actor,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the reply timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn actor(&self) -> &ActorRef<CollectionMessage> {
        &self.actor
    }

    /// Fire-and-forget lifecycle event.
    pub fn track(&self, event: StatusEvent) -> Result<(), ActorError> {
        self.actor
            .send_message(CollectionMessage::Track { event })
            .map_err(|e| ActorError::Actor(e.to_string()))
    }

    pub async fn refresh(&self) -> Result<u64, ActorError> {
        flatten(ask(&self.actor, |reply| CollectionMessage::Refresh { reply }, self.timeout).await)
    }

    pub async fn remove_expired(&self) -> Result<u64, ActorError> {
        flatten(
            ask(
                &self.actor,
                |reply| CollectionMessage::RemoveExpired { reply },
                self.timeout,
            )
            .await,
        )
    }

    pub async fn total(&self) -> Result<u64, ActorError> {
        flatten(ask(&self.actor, |reply| CollectionMessage::Total { reply }, self.timeout).await)
    }

    pub async fn page(&self, page: Page) -> Result<Vec<ProjectedRecord>, ActorError> {
        flatten(
            ask(
                &self.actor,
                |reply| CollectionMessage::Page { page, reply },
                self.timeout,
            )
            .await,
        )
    }

    pub async fn delete_status(&self, jid: Jid) -> Result<u64, ActorError> {
        flatten(
            ask(
                &self.actor,
                |reply| CollectionMessage::DeleteStatus { jid, reply },
                self.timeout,
            )
            .await,
        )
    }
}

fn flatten<T>(result: Result<Result<T, IndexError>, ActorError>) -> Result<T, ActorError> {
    Ok(result??)
}

/// Look up (spawning if needed) the collection actor for a worker.
pub async fn collection(
    supervisor: &ActorRef<SupervisorMessage>,
    worker: impl Into<WorkerName>,
) -> Result<CollectionHandle, ActorError> {
    let worker = worker.into();
    let actor = ask(
        supervisor,
        |reply| SupervisorMessage::GetCollection { worker, reply },
        DEFAULT_TIMEOUT,
    )
    .await?;
    Ok(CollectionHandle::new(actor))
}

/// Namespaces with a running collection actor.
pub async fn list_collections(
    supervisor: &ActorRef<SupervisorMessage>,
) -> Result<Vec<String>, ActorError> {
    ask(
        supervisor,
        |reply| SupervisorMessage::ListCollections { reply },
        DEFAULT_TIMEOUT,
    )
    .await
}
