//! Feeds the global event log to registered projections.

use event_store::{EventEnvelope, EventStore};
use futures_util::StreamExt;
use tokio::sync::Mutex;

use crate::Result;
use crate::projection::Projection;

/// Delivers events from an event store to projections.
///
/// Each projection tracks its own [`ProjectionPosition`](crate::ProjectionPosition),
/// so a projection registered late, or reset, is fed from the start of the log
/// while the others only receive what they have not seen.
///
/// Catch-up and rebuild hold one lock so that concurrent callers never deliver
/// the same event twice.
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    catch_up: Mutex<()>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            catch_up: Mutex::new(()),
        }
    }

    pub fn register(&mut self, projection: Box<dyn Projection>) {
        tracing::debug!(projection = projection.name(), "projection registered");
        self.projections.push(projection);
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Brings every projection up to the end of the log.
    ///
    /// Returns the number of (event, projection) deliveries made.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<u64> {
        let _running = self.catch_up.lock().await;
        self.deliver_unseen().await
    }

    /// Resets every projection and replays the whole log.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<u64> {
        let _running = self.catch_up.lock().await;
        for projection in &self.projections {
            projection.reset().await?;
        }
        tracing::info!(projections = self.projections.len(), "rebuilding read models");
        self.deliver_unseen().await
    }

    /// Hands one event to every projection, bypassing position checks.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn process_event(&self, event: &EventEnvelope) -> Result<()> {
        for projection in &self.projections {
            projection.handle(event).await?;
        }
        Ok(())
    }

    async fn deliver_unseen(&self) -> Result<u64> {
        let mut stream = self.store.stream_all_events().await?;
        let mut index: u64 = 0;
        let mut delivered: u64 = 0;

        while let Some(event) = stream.next().await {
            let event = event?;
            index += 1;

            for projection in &self.projections {
                if projection.position().await.is_behind(index) {
                    projection.handle(&event).await?;
                    delivered += 1;
                }
            }
        }

        if delivered > 0 {
            metrics::counter!("projections_events_processed").increment(delivered);
        }
        tracing::debug!(log_length = index, delivered, "catch-up complete");
        Ok(delivered)
    }
}
