use std::collections::HashSet;
use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{AggregateId, EventEnvelope, EventStoreError, Result, Version};

/// Options for appending events to one stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendOptions {
    /// Version the writer read the stream at. `None` skips the check.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects the aggregate to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Expects the aggregate to have no events yet.
    pub fn expect_new() -> Self {
        Self::expect_version(Version::initial())
    }
}

/// New events for a single aggregate, staged as part of a larger commit.
#[derive(Debug, Clone)]
pub struct StreamAppend {
    pub events: Vec<EventEnvelope>,
    pub options: AppendOptions,
}

impl StreamAppend {
    pub fn new(events: Vec<EventEnvelope>, options: AppendOptions) -> Self {
        Self { events, options }
    }

    /// The aggregate this append targets, taken from its first event.
    pub fn aggregate_id(&self) -> Option<AggregateId> {
        self.events.first().map(|e| e.aggregate_id)
    }
}

/// A stream of events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Core trait for event store implementations.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to one or more aggregates as a single unit.
    ///
    /// Every expected version is checked before anything is written. If any
    /// check or write fails, no event from any stream in the batch is stored.
    ///
    /// Returns the new version of each stream, in input order.
    async fn append_streams(&self, appends: Vec<StreamAppend>) -> Result<Vec<Version>>;

    /// Retrieves all events for an aggregate, oldest first.
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    /// Streams every event in the store in insertion order.
    async fn stream_all_events(&self) -> Result<EventStream>;

    /// Returns the current version of an aggregate, or `None` if it has no events.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;
}

/// Convenience methods built on [`EventStore`].
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Appends events to a single aggregate.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        let versions = self
            .append_streams(vec![StreamAppend::new(events, options)])
            .await?;
        Ok(versions.last().copied().unwrap_or_default())
    }

    /// Checks if an aggregate has any events.
    async fn aggregate_exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.get_aggregate_version(aggregate_id).await?.is_some())
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Rejects batches a store must not write: empty streams, mixed aggregates
/// inside one stream, gaps in versions, or the same aggregate twice.
pub fn validate_appends(appends: &[StreamAppend]) -> Result<()> {
    if appends.is_empty() {
        return Err(EventStoreError::InvalidAppend(
            "cannot commit an empty batch".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(appends.len());
    for append in appends {
        let Some(first) = append.events.first() else {
            return Err(EventStoreError::InvalidAppend(
                "cannot append an empty event list".to_string(),
            ));
        };

        if !seen.insert(first.aggregate_id) {
            return Err(EventStoreError::InvalidAppend(format!(
                "aggregate {} appears twice in one commit",
                first.aggregate_id
            )));
        }

        let mut expected_version = first.version;
        for event in append.events.iter().skip(1) {
            if event.aggregate_id != first.aggregate_id
                || event.aggregate_type != first.aggregate_type
            {
                return Err(EventStoreError::InvalidAppend(
                    "all events in a stream must belong to the same aggregate".to_string(),
                ));
            }
            expected_version = expected_version.next();
            if event.version != expected_version {
                return Err(EventStoreError::InvalidAppend(format!(
                    "event versions must be sequential: expected {}, got {}",
                    expected_version, event.version
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(aggregate_id: AggregateId, version: i64) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("Wallet")
            .event_type("FundsDeposited")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({}))
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_sequential_streams() {
        let a = AggregateId::new();
        let b = AggregateId::new();
        let appends = vec![
            StreamAppend::new(vec![event(a, 1), event(a, 2)], AppendOptions::expect_new()),
            StreamAppend::new(vec![event(b, 4)], AppendOptions::expect_version(Version::new(3))),
        ];
        assert!(validate_appends(&appends).is_ok());
    }

    #[test]
    fn rejects_version_gap() {
        let a = AggregateId::new();
        let appends = vec![StreamAppend::new(
            vec![event(a, 1), event(a, 3)],
            AppendOptions::new(),
        )];
        assert!(matches!(
            validate_appends(&appends),
            Err(EventStoreError::InvalidAppend(_))
        ));
    }

    #[test]
    fn rejects_duplicate_aggregate() {
        let a = AggregateId::new();
        let appends = vec![
            StreamAppend::new(vec![event(a, 1)], AppendOptions::new()),
            StreamAppend::new(vec![event(a, 2)], AppendOptions::new()),
        ];
        assert!(validate_appends(&appends).is_err());
    }

    #[test]
    fn rejects_empty_stream() {
        let appends = vec![StreamAppend::new(vec![], AppendOptions::new())];
        assert!(validate_appends(&appends).is_err());
        assert!(validate_appends(&[]).is_err());
    }
}
