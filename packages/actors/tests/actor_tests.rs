#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use actors::{
    ActorError, CollectionMessage, SupervisorMessage, SweepConfig, collection, list_collections,
    start_supervisor,
};
use status_core::{Clock, IndexError, Jid, Keyspace, ManualClock, Page, StatusEvent};

use common::WORKER;

#[tokio::test]
async fn test_events_are_routed_per_worker() -> Result<(), Box<dyn Error>> {
    let fx = common::setup(common::manual_sweep()).await?;

    for jid in ["a", "b"] {
        fx.supervisor.send_message(SupervisorMessage::Track {
            event: StatusEvent::published(WORKER, Jid::new(jid), "queued", 60),
        })?;
    }
    fx.supervisor.send_message(SupervisorMessage::Track {
        event: StatusEvent::published("OtherJob", Jid::new("c"), "queued", 60),
    })?;
    // Same collection as WORKER
    fx.supervisor.send_message(SupervisorMessage::Track {
        event: StatusEvent::deleted("collectionjob", Jid::new("b")),
    })?;

    let jobs = collection(&fx.supervisor, WORKER).await?;
    assert_eq!(jobs.total().await?, 1);

    let other = collection(&fx.supervisor, "OtherJob").await?;
    assert_eq!(other.total().await?, 1);

    assert_eq!(
        list_collections(&fx.supervisor).await?,
        vec!["statuses_all:collectionjob", "statuses_all:otherjob"]
    );

    fx.supervisor.send_message(SupervisorMessage::Shutdown)?;
    fx.handle.await?;

    Ok(())
}

#[tokio::test]
async fn test_tick_prunes_expired_entries() -> Result<(), Box<dyn Error>> {
    let fx = common::setup(common::manual_sweep()).await?;
    let jobs = collection(&fx.supervisor, WORKER).await?;

    jobs.track(StatusEvent::published(WORKER, Jid::new("short"), "queued", 5))?;
    jobs.track(StatusEvent::published(WORKER, Jid::new("long"), "queued", 500))?;
    assert_eq!(jobs.total().await?, 2);

    fx.clock.advance(10);
    jobs.actor().send_message(CollectionMessage::Tick)?;
    assert_eq!(jobs.total().await?, 1);
    assert_eq!(jobs.remove_expired().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_tick_refreshes_on_schedule() -> Result<(), Box<dyn Error>> {
    let fx = common::setup(common::manual_sweep().with_refresh_every(2)).await?;
    let jobs = collection(&fx.supervisor, WORKER).await?;

    fx.publish(WORKER, "a", 60).await?;
    fx.publish(WORKER, "b", 60).await?;
    fx.publish("OtherJob", "c", 60).await?;

    jobs.actor().send_message(CollectionMessage::Tick)?;
    assert_eq!(jobs.total().await?, 0);

    jobs.actor().send_message(CollectionMessage::Tick)?;
    assert_eq!(jobs.total().await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_refresh_on_start() -> Result<(), Box<dyn Error>> {
    let fx = common::setup(common::manual_sweep().with_refresh_on_start(true)).await?;

    fx.publish(WORKER, "a", 60).await?;
    fx.publish(WORKER, "b", 60).await?;

    let jobs = collection(&fx.supervisor, WORKER).await?;
    assert_eq!(jobs.total().await?, 2);
    assert_eq!(jobs.refresh().await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_page_and_delete_through_actor() -> Result<(), Box<dyn Error>> {
    let fx = common::setup(common::manual_sweep()).await?;
    let jobs = collection(&fx.supervisor, WORKER).await?;

    fx.publish(WORKER, "abc", 60).await?;
    jobs.track(StatusEvent::published(WORKER, Jid::new("abc"), "complete", 60))?;

    let records = jobs.page(Page::default()).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].jid.as_str(), "abc");
    assert_eq!(records[0].status.as_deref(), Some("complete"));

    assert!(matches!(
        jobs.page(Page::new(0, 10)).await,
        Err(ActorError::Index(IndexError::InvalidArgument(_)))
    ));

    assert_eq!(jobs.delete_status(Jid::new("abc")).await?, 1);
    assert_eq!(jobs.total().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_background_ticker() -> Result<(), Box<dyn Error>> {
    let sweep = SweepConfig::default().with_interval(Duration::from_millis(20));
    let fx = common::setup(sweep).await?;
    let jobs = collection(&fx.supervisor, WORKER).await?;

    jobs.track(StatusEvent::published(WORKER, Jid::new("short"), "queued", 1))?;
    assert_eq!(jobs.total().await?, 1);
    fx.clock.advance(5);

    let mut remaining = 1;
    for _ in 0..100 {
        remaining = jobs.total().await?;
        if remaining == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(remaining, 0);

    Ok(())
}

#[tokio::test]
async fn test_refresh_matches_any_worker_spelling() -> Result<(), Box<dyn Error>> {
    let fx = common::setup(common::manual_sweep()).await?;

    fx.publish(WORKER, "a", 60).await?;
    fx.publish(WORKER, "b", 60).await?;

    // The collection actor is created from the lowercase spelling
    let lower = collection(&fx.supervisor, "collectionjob").await?;
    let display = collection(&fx.supervisor, WORKER).await?;
    assert_eq!(display.refresh().await?, 2);
    assert_eq!(lower.total().await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_supervisor_survives_failed_collection_start() -> Result<(), Box<dyn Error>> {
    let store = Arc::new(common::UnreachableStore);
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(common::START));
    let sweep = common::manual_sweep().with_refresh_on_start(true);
    let (supervisor, handle) = start_supervisor(store, clock, Keyspace::default(), sweep).await?;

    assert!(matches!(
        collection(&supervisor, WORKER).await,
        Err(ActorError::Actor(_))
    ));
    supervisor.send_message(SupervisorMessage::Track {
        event: StatusEvent::published(WORKER, Jid::new("a"), "queued", 60),
    })?;

    // Still answering, with nothing registered
    assert!(list_collections(&supervisor).await?.is_empty());

    supervisor.send_message(SupervisorMessage::Shutdown)?;
    handle.await?;

    Ok(())
}
