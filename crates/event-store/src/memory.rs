use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{EventStore, EventStream, StreamAppend, validate_appends},
};

#[derive(Default)]
struct MemoryState {
    events: Vec<EventEnvelope>,
    versions: HashMap<AggregateId, Version>,
}

/// In-memory event store.
///
/// Used by tests and by the server when no database is configured. A whole
/// batch is checked and written under one write lock.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    state: Arc<RwLock<MemoryState>>,
    fail_on_append: Arc<AtomicBool>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.state.read().await.events.len()
    }

    /// Makes every following append fail after its version checks pass,
    /// as a database would on a lost connection.
    pub fn set_fail_on_append(&self, fail: bool) {
        self.fail_on_append.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append_streams(&self, appends: Vec<StreamAppend>) -> Result<Vec<Version>> {
        validate_appends(&appends)?;

        let mut state = self.state.write().await;

        let mut new_versions = Vec::with_capacity(appends.len());
        for append in &appends {
            let Some(first) = append.events.first() else {
                continue;
            };
            let aggregate_id = first.aggregate_id;
            let current = state
                .versions
                .get(&aggregate_id)
                .copied()
                .unwrap_or_else(Version::initial);

            if let Some(expected) = append.options.expected_version
                && current != expected
            {
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id,
                    expected,
                    actual: current,
                });
            }

            // Same guarantee as the unique (aggregate_id, version) constraint.
            if first.version != current.next() {
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id,
                    expected: append.options.expected_version.unwrap_or(current),
                    actual: current,
                });
            }

            let last = append.events.last().map_or(current, |e| e.version);
            new_versions.push((aggregate_id, last));
        }

        if self.fail_on_append.load(Ordering::SeqCst) {
            return Err(EventStoreError::Unavailable(
                "write rejected by failure injection".to_string(),
            ));
        }

        for (aggregate_id, version) in &new_versions {
            state.versions.insert(*aggregate_id, *version);
        }
        let written: usize = appends.iter().map(|a| a.events.len()).sum();
        for append in appends {
            state.events.extend(append.events);
        }
        metrics::counter!("events_appended_total").increment(written as u64);

        Ok(new_versions.into_iter().map(|(_, v)| v).collect())
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let state = self.state.read().await;
        let mut events: Vec<_> = state
            .events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn stream_all_events(&self) -> Result<EventStream> {
        use futures_util::stream;

        let events = self.state.read().await.events.clone();
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        Ok(self.state.read().await.versions.get(&aggregate_id).copied())
    }
}
