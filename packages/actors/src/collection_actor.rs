//! Collection actor that keeps one worker's collection tidy.

use std::marker::PhantomData;
use std::time::Duration;

use ractor::{Actor, ActorProcessingErr, ActorRef};
use status_collection::CollectionIndex;
use status_core::{IndexStore, StatusStore};

use crate::messages::CollectionMessage;

/// Background maintenance schedule.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between ticks. Zero disables the ticker.
    pub interval: Duration,
    /// Rebuild the collection every N ticks; `None` never rebuilds on tick.
    pub refresh_every: Option<u32>,
    /// Rebuild the collection once when the actor starts. A failed rebuild
    /// fails the spawn.
    pub refresh_on_start: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            refresh_every: None,
            refresh_on_start: false,
        }
    }
}

impl SweepConfig {
    /// Set the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Rebuild every `ticks` ticks.
    pub fn with_refresh_every(mut self, ticks: u32) -> Self {
        self.refresh_every = Some(ticks.max(1));
        self
    }

    /// Rebuild once on start.
    pub fn with_refresh_on_start(mut self, refresh: bool) -> Self {
        self.refresh_on_start = refresh;
        self
    }
}

/// State for the collection actor.
pub struct CollectionActorState<S> {
    /// The collection being maintained.
    pub index: CollectionIndex<S>,
    /// Maintenance schedule.
    pub config: SweepConfig,
    /// Ticks handled so far.
    ticks: u64,
}

impl<S> CollectionActorState<S> {
    pub fn new(index: CollectionIndex<S>, config: SweepConfig) -> Self {
        Self {
            index,
            config,
            ticks: 0,
        }
    }
}

impl<S> CollectionActorState<S>
where
    S: StatusStore + IndexStore + 'static,
{
    /// Housekeeping for one tick: prune, and rebuild when due.
    async fn sweep(&mut self) {
        self.ticks += 1;

        match self.index.remove_expired().await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(
                "Pruned {} expired entries from {}",
                removed,
                self.index.namespace()
            ),
            Err(e) => tracing::warn!("Failed to prune {}: {}", self.index.namespace(), e),
        }

        if let Some(every) = self.config.refresh_every
            && self.ticks % u64::from(every.max(1)) == 0
            && let Err(e) = self.index.refresh_collection().await
        {
            tracing::warn!("Failed to refresh {}: {}", self.index.namespace(), e);
        }
    }
}

/// Collection actor that owns one [`CollectionIndex`].
pub struct CollectionActor<S> {
    _store: PhantomData<fn() -> S>,
}

impl<S> CollectionActor<S> {
    pub fn new() -> Self {
        Self {
            _store: PhantomData,
        }
    }
}

impl<S> Default for CollectionActor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Actor for CollectionActor<S>
where
    S: StatusStore + IndexStore + 'static,
{
    type Msg = CollectionMessage;
    type State = CollectionActorState<S>;
    type Arguments = CollectionActorState<S>;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting collection actor: {}", args.index.namespace());

        // A collection that cannot reach its store on start does not start
        if args.config.refresh_on_start {
            args.index.refresh_collection().await?;
        }

        // Start periodic tick
        let interval = args.config.interval;
        if !interval.is_zero() {
            let myself_clone = myself.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(interval);
                loop {
                    interval.tick().await;
                    if myself_clone.send_message(CollectionMessage::Tick).is_err() {
                        break;
                    }
                }
            });
        }

        Ok(args)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            CollectionMessage::Track { event } => {
                if let Err(e) = state.index.track(&event).await {
                    tracing::warn!("Failed to track {}: {}", event.description(), e);
                }
            }

            CollectionMessage::Refresh { reply } => {
                let _ = reply.send(state.index.refresh_collection().await);
            }

            CollectionMessage::RemoveExpired { reply } => {
                let _ = reply.send(state.index.remove_expired().await);
            }

            CollectionMessage::Total { reply } => {
                let _ = reply.send(state.index.total().await);
            }

            CollectionMessage::Page { page, reply } => {
                let result = match state.index.all(page) {
                    Ok(view) => view.to_vec().await,
                    Err(e) => Err(e),
                };
                let _ = reply.send(result);
            }

            CollectionMessage::DeleteStatus { jid, reply } => {
                let _ = reply.send(state.index.delete_status(&jid).await);
            }

            CollectionMessage::Tick => state.sweep().await,

            CollectionMessage::Shutdown => {
                tracing::info!("Shutting down collection actor: {}", state.index.namespace());
                myself.stop(None);
            }
        }

        Ok(())
    }
}
