//! The projection and read model traits.

use async_trait::async_trait;
use event_store::EventEnvelope;

use crate::Result;

/// How far into the global event log a projection has read.
///
/// Counts every event seen, including events the projection ignores, so it
/// lines up with the log index used during catch-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProjectionPosition(u64);

impl ProjectionPosition {
    pub const START: Self = Self(0);

    pub fn events_seen(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether the event at 1-based log `index` has not been seen yet.
    pub fn is_behind(self, index: u64) -> bool {
        self.0 < index
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Folds events from the log into a read model.
///
/// `handle` is called once per event in log order and must advance the
/// position even for events it does not care about.
#[async_trait]
pub trait Projection: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    async fn position(&self) -> ProjectionPosition;

    /// Drops all projected state and rewinds to [`ProjectionPosition::START`].
    async fn reset(&self) -> Result<()>;
}

/// Query side of a projection.
pub trait ReadModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of top-level records held.
    fn count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_has_seen_nothing() {
        assert_eq!(ProjectionPosition::START.events_seen(), 0);
        assert_eq!(ProjectionPosition::default(), ProjectionPosition::START);
    }

    #[test]
    fn test_behind_until_index_is_reached() {
        let pos = ProjectionPosition::START.next().next();

        assert!(!pos.is_behind(1));
        assert!(!pos.is_behind(2));
        assert!(pos.is_behind(3));
        assert_eq!(pos.to_string(), "@2");
    }
}
