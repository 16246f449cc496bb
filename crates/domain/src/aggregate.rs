//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::CommerceError;

/// A fact recorded against one aggregate, named in the past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name stored alongside the payload.
    fn event_type(&self) -> &'static str;
}

/// An event-sourced aggregate.
///
/// State is rebuilt by replaying events through [`Aggregate::apply`].
/// Commands are inherent methods that read the state and return new events
/// without mutating it; the caller applies them once they are committed.
///
/// Every store aggregate starts unopened (no id) and becomes usable when its
/// opening event is applied.
pub trait Aggregate: Default + Send + Sync + Sized {
    type Event: DomainEvent;

    /// The type of errors this aggregate's commands can produce.
    type Error: std::error::Error + Send + Sync;

    /// Stream name, e.g. "Wallet". Also used as the entity in `NotFound`.
    fn aggregate_type() -> &'static str;

    /// Returns None until the opening event has been applied.
    fn id(&self) -> Option<AggregateId>;

    /// Version of the last applied event. `Version::initial()` when unopened.
    fn version(&self) -> Version;

    /// Called by the command handler after loading events.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic and must not fail:
    /// events represent facts that have already happened.
    fn apply(&mut self, event: Self::Event);

    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }

    fn is_open(&self) -> bool {
        self.id().is_some()
    }

    /// Fails with `NotFound` on an aggregate whose stream has no events.
    fn ensure_open(&self) -> Result<(), CommerceError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CommerceError::not_found(Self::aggregate_type(), "unopened"))
        }
    }
}
