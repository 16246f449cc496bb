//! Staging of events for several aggregates, committed as one unit.

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, StreamAppend, Version};
use uuid::Uuid;

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Collects the new events of every aggregate touched by one operation.
///
/// Nothing reaches the store until [`UnitOfWork::commit`], which appends all
/// staged streams through a single [`EventStore::append_streams`] call. Each
/// stream expects the version its aggregate was loaded at, so a concurrent
/// writer on any of them makes the whole commit fail without effect.
#[derive(Debug)]
pub struct UnitOfWork {
    commit_id: Uuid,
    appends: Vec<StreamAppend>,
}

impl Default for UnitOfWork {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self {
            commit_id: Uuid::new_v4(),
            appends: Vec::new(),
        }
    }

    /// Identifier recorded in the metadata of every envelope of this commit.
    pub fn commit_id(&self) -> Uuid {
        self.commit_id
    }

    /// Number of staged streams.
    pub fn len(&self) -> usize {
        self.appends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appends.is_empty()
    }

    /// Stages `events` for the aggregate at `aggregate_id`, expecting it to
    /// still be at `aggregate.version()` when the commit lands.
    ///
    /// An empty event list stages nothing.
    pub fn stage<A: Aggregate>(
        &mut self,
        aggregate_id: AggregateId,
        aggregate: &A,
        events: &[A::Event],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let current_version = aggregate.version();
        let envelopes = build_envelopes::<A>(
            aggregate_id,
            current_version,
            events,
            Some(self.commit_id),
        )?;
        self.appends.push(StreamAppend::new(
            envelopes,
            AppendOptions::expect_version(current_version),
        ));
        Ok(())
    }

    /// Appends every staged stream atomically and returns their new versions
    /// in staging order.
    pub async fn commit<S>(self, store: &S) -> Result<Vec<Version>, DomainError>
    where
        S: EventStore + ?Sized,
    {
        if self.appends.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(commit_id = %self.commit_id, streams = self.appends.len(), "committing");
        Ok(store.append_streams(self.appends).await?)
    }
}

/// Wraps domain events into envelopes numbered after `current_version`.
pub(crate) fn build_envelopes<A: Aggregate>(
    aggregate_id: AggregateId,
    current_version: Version,
    events: &[A::Event],
    commit_id: Option<Uuid>,
) -> Result<Vec<EventEnvelope>, DomainError> {
    let mut envelopes = Vec::with_capacity(events.len());
    let mut version = current_version;

    for event in events {
        version = version.next();
        let mut builder = EventEnvelope::builder()
            .stream(aggregate_id, A::aggregate_type())
            .event_type(event.event_type())
            .version(version)
            .payload(event)?;
        if let Some(commit_id) = commit_id {
            builder = builder.commit_id(commit_id);
        }
        envelopes.push(builder.build()?);
    }

    Ok(envelopes)
}
