//! Supervisor actor that owns one collection actor per worker.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use ractor::{Actor, ActorProcessingErr, ActorRef, SupervisionEvent};
use status_collection::CollectionIndex;
use status_core::{Clock, IndexStore, Keyspace, StatusStore, WorkerName};

use crate::collection_actor::{CollectionActor, CollectionActorState, SweepConfig};
use crate::messages::{CollectionMessage, SupervisorMessage};

/// Arguments for the supervisor.
pub struct SupervisorArgs<S> {
    /// Store shared by every collection.
    pub store: Arc<S>,
    /// Clock shared by every collection.
    pub clock: Arc<dyn Clock>,
    pub keyspace: Keyspace,
    pub sweep: SweepConfig,
}

/// State for the supervisor actor.
pub struct SupervisorState<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    keyspace: Keyspace,
    sweep: SweepConfig,
    /// Collection actors by namespace.
    pub collections: HashMap<String, ActorRef<CollectionMessage>>,
}

impl<S> SupervisorState<S>
where
    S: StatusStore + IndexStore + 'static,
{
    fn new(args: SupervisorArgs<S>) -> Self {
        Self {
            store: args.store,
            clock: args.clock,
            keyspace: args.keyspace,
            sweep: args.sweep,
            collections: HashMap::new(),
        }
    }

    /// Collection actor for `worker`, spawned on first use.
    async fn collection_for(
        &mut self,
        myself: &ActorRef<SupervisorMessage>,
        worker: &WorkerName,
    ) -> Result<ActorRef<CollectionMessage>, ActorProcessingErr> {
        let namespace = self.keyspace.namespace(worker);
        if let Some(actor) = self.collections.get(&namespace) {
            return Ok(actor.clone());
        }

        let index = CollectionIndex::new(self.store.clone(), worker.clone())
            .with_keyspace(self.keyspace.clone())
            .with_clock(self.clock.clone());
        let args = CollectionActorState::new(index, self.sweep.clone());

        let (actor, _handle) =
            Actor::spawn_linked(None, CollectionActor::<S>::new(), args, myself.get_cell())
                .await
                .map_err(|e| {
                    ActorProcessingErr::from(format!("Failed to spawn collection: {}", e))
                })?;

        self.collections.insert(namespace, actor.clone());
        Ok(actor)
    }

    fn forget(&mut self, id: ractor::ActorId) {
        self.collections.retain(|_, actor| actor.get_id() != id);
    }
}

/// Supervisor actor that routes lifecycle events to collections.
pub struct CollectionSupervisor<S> {
    _store: PhantomData<fn() -> S>,
}

impl<S> CollectionSupervisor<S> {
    pub fn new() -> Self {
        Self {
            _store: PhantomData,
        }
    }
}

impl<S> Default for CollectionSupervisor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Actor for CollectionSupervisor<S>
where
    S: StatusStore + IndexStore + 'static,
{
    type Msg = SupervisorMessage;
    type State = SupervisorState<S>;
    type Arguments = SupervisorArgs<S>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting collection supervisor");
        Ok(SupervisorState::new(args))
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisorMessage::Track { event } => {
                let actor = match state.collection_for(&myself, event.worker()).await {
                    Ok(actor) => actor,
                    Err(e) => {
                        tracing::warn!("Dropping event {}: {}", event.description(), e);
                        return Ok(());
                    }
                };
                tracing::debug!("Routing event: {}", event.description());
                if let Err(e) = actor.send_message(CollectionMessage::Track { event }) {
                    tracing::warn!("Failed to route event: {}", e);
                }
            }

            // Dropping the reply port tells the caller the lookup failed
            SupervisorMessage::GetCollection { worker, reply } => {
                match state.collection_for(&myself, &worker).await {
                    Ok(actor) => {
                        let _ = reply.send(actor);
                    }
                    Err(e) => tracing::warn!("No collection for {}: {}", worker, e),
                }
            }

            SupervisorMessage::ListCollections { reply } => {
                let mut names: Vec<String> = state.collections.keys().cloned().collect();
                names.sort();
                let _ = reply.send(names);
            }

            SupervisorMessage::Shutdown => {
                tracing::info!("Shutting down collection supervisor");
                for actor in state.collections.values() {
                    let _ = actor.send_message(CollectionMessage::Shutdown);
                }
                myself.stop(None);
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                tracing::debug!("Collection actor {} stopped: {:?}", cell.get_id(), reason);
                state.forget(cell.get_id());
            }
            SupervisionEvent::ActorFailed(cell, err) => {
                tracing::warn!("Collection actor {} failed: {}", cell.get_id(), err);
                state.forget(cell.get_id());
            }
            _ => {}
        }
        Ok(())
    }
}

/// Start a supervisor over `store`.
pub async fn start_supervisor<S>(
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    keyspace: Keyspace,
    sweep: SweepConfig,
) -> Result<(ActorRef<SupervisorMessage>, tokio::task::JoinHandle<()>), ractor::SpawnErr>
where
    S: StatusStore + IndexStore + 'static,
{
    let args = SupervisorArgs {
        store,
        clock,
        keyspace,
        sweep,
    };
    Actor::spawn(None, CollectionSupervisor::<S>::new(), args).await
}
