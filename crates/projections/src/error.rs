use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("reading the event log failed: {0}")]
    EventStore(#[from] event_store::EventStoreError),

    /// A payload did not match the event type the projection expected.
    #[error("cannot decode {event_type} event {event_id}: {source}")]
    Payload {
        event_type: String,
        event_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ProjectionError {
    pub fn payload(event: &event_store::EventEnvelope, source: serde_json::Error) -> Self {
        ProjectionError::Payload {
            event_type: event.event_type.clone(),
            event_id: event.event_id.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
