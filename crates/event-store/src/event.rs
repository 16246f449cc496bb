use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{AggregateId, EventStoreError};

/// Metadata key shared by every envelope written in the same atomic commit.
pub const COMMIT_ID: &str = "commit_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// A fresh random id. Envelopes get one unless the caller supplies it.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of events in an aggregate's stream.
///
/// An empty stream is at 0 and the n-th event carries version n, so the
/// version an append expects is the one the aggregate was loaded at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn initial() -> Self {
        Self(0)
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One row of the log.
///
/// `payload` is the serialized domain event, tagged with its variant name in
/// `event_type` so readers can skip events they do not understand without
/// decoding them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    /// e.g. "FundsDebited"
    pub event_type: String,
    pub aggregate_id: AggregateId,
    /// e.g. "Wallet"
    pub aggregate_type: String,
    pub version: Version,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelope {
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }

    /// Whether this event belongs to a stream of `aggregate_type`.
    pub fn is_from(&self, aggregate_type: &str) -> bool {
        self.aggregate_type == aggregate_type
    }

    /// Deserializes the payload into the aggregate's event type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Id of the atomic commit that wrote this event, if one was recorded.
    ///
    /// Events written together by a checkout or refund share it.
    pub fn commit_id(&self) -> Option<&str> {
        self.metadata.get(COMMIT_ID).and_then(|v| v.as_str())
    }
}

/// Collects the fields of an [`EventEnvelope`].
///
/// `event_id` and `timestamp` are filled in by [`build`](Self::build) when
/// not set; everything else is required.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    version: Option<Version>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
    metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelopeBuilder {
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Places the event in the stream of `aggregate_id`.
    pub fn stream(self, aggregate_id: AggregateId, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_id(aggregate_id).aggregate_type(aggregate_type)
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Tags the event as part of the atomic commit `commit_id`.
    pub fn commit_id(self, commit_id: impl fmt::Display) -> Self {
        self.metadata(COMMIT_ID, serde_json::Value::String(commit_id.to_string()))
    }

    pub fn build(self) -> Result<EventEnvelope, EventStoreError> {
        use EventStoreError::IncompleteEnvelope as Missing;

        Ok(EventEnvelope {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type.ok_or(Missing("event_type"))?,
            aggregate_id: self.aggregate_id.ok_or(Missing("aggregate_id"))?,
            aggregate_type: self.aggregate_type.ok_or(Missing("aggregate_type"))?,
            version: self.version.ok_or(Missing("version"))?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.ok_or(Missing("payload"))?,
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    enum LedgerEvent {
        FundsDeposited { amount: i64 },
    }

    fn deposit(amount: i64) -> EventEnvelopeBuilder {
        EventEnvelope::builder()
            .stream(AggregateId::new(), "Wallet")
            .event_type("FundsDeposited")
            .version(Version::first())
            .payload(&LedgerEvent::FundsDeposited { amount })
            .unwrap()
    }

    #[test]
    fn versions_count_events() {
        assert_eq!(Version::initial(), Version::new(0));
        assert_eq!(Version::initial().next(), Version::first());
        assert!(Version::new(2) < Version::new(3));
        assert_eq!(Version::new(7).to_string(), "7");
    }

    #[test]
    fn payload_decodes_back_into_the_event() {
        let envelope = deposit(2500).build().unwrap();

        assert!(envelope.is_from("Wallet"));
        assert!(!envelope.is_from("Cart"));
        assert_eq!(
            envelope.decode::<LedgerEvent>().unwrap(),
            LedgerEvent::FundsDeposited { amount: 2500 }
        );
    }

    #[test]
    fn decode_reports_a_foreign_payload() {
        let envelope = deposit(1)
            .payload_raw(serde_json::json!({"type": "GameAdded", "title": "Braid"}))
            .build()
            .unwrap();

        assert!(envelope.decode::<LedgerEvent>().is_err());
    }

    #[test]
    fn commit_id_is_recorded_in_metadata() {
        let commit = Uuid::new_v4();
        let envelope = deposit(100).commit_id(commit).build().unwrap();

        assert_eq!(envelope.commit_id(), Some(commit.to_string().as_str()));
        assert_eq!(envelope.metadata.len(), 1);
        assert_eq!(deposit(100).build().unwrap().commit_id(), None);
    }

    #[test]
    fn build_fills_in_id_and_timestamp() {
        let before = Utc::now();
        let a = deposit(1).build().unwrap();
        let b = deposit(1).build().unwrap();

        assert_ne!(a.event_id, b.event_id);
        assert!(a.timestamp >= before);
    }

    #[test]
    fn build_names_the_first_missing_field() {
        let err = EventEnvelope::builder()
            .event_type("FundsDebited")
            .build()
            .unwrap_err();
        assert!(matches!(err, EventStoreError::IncompleteEnvelope("aggregate_id")));

        let err = EventEnvelope::builder()
            .stream(AggregateId::new(), "Wallet")
            .event_type("FundsDebited")
            .version(Version::first())
            .build()
            .unwrap_err();
        assert!(matches!(err, EventStoreError::IncompleteEnvelope("payload")));
    }
}
