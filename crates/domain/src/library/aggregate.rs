//! Library aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, GameId, UserId};
use event_store::Version;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::error::CommerceError;
use crate::value_objects::CatalogItemRef;

use super::LibraryEvent;

/// An owned game and the purchase that granted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    pub item: CatalogItemRef,
    pub purchase_id: AggregateId,
    pub acquired_at: DateTime<Utc>,
}

/// A user's owned games. Each game appears at most once.
///
/// Ownership is tracked per game: revoking a game removes it whichever
/// purchase granted it.
#[derive(Debug, Clone, Default)]
pub struct Library {
    id: Option<AggregateId>,
    version: Version,
    owner: Option<UserId>,
    entries: Vec<LibraryEntry>,
}

impl Aggregate for Library {
    type Event = LibraryEvent;
    type Error = CommerceError;

    fn aggregate_type() -> &'static str {
        "Library"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            LibraryEvent::LibraryOpened(data) => {
                self.id = Some(data.library_id);
                self.owner = Some(data.owner);
                self.entries.clear();
            }
            LibraryEvent::GamesGranted(data) => {
                for item in data.items {
                    if !self.contains(item.game_id) {
                        self.entries.push(LibraryEntry {
                            item,
                            purchase_id: data.purchase_id,
                            acquired_at: data.granted_at,
                        });
                    }
                }
            }
            LibraryEvent::GamesRevoked(data) => {
                self.entries
                    .retain(|entry| !data.game_ids.contains(&entry.item.game_id));
            }
        }
    }
}

// Query methods
impl Library {
    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn items(&self) -> impl Iterator<Item = &CatalogItemRef> {
        self.entries.iter().map(|entry| &entry.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, game_id: GameId) -> bool {
        self.entries.iter().any(|entry| entry.item.game_id == game_id)
    }
}

// Command methods (return events)
impl Library {
    pub fn open(
        &self,
        library_id: AggregateId,
        owner: UserId,
    ) -> Result<Vec<LibraryEvent>, CommerceError> {
        if self.id.is_some() {
            return Err(CommerceError::invalid_input("library already opened"));
        }
        Ok(vec![LibraryEvent::opened(library_id, owner)])
    }

    /// Grants the games bought by `purchase_id`.
    ///
    /// Games already owned are skipped. Granting only owned games produces
    /// no event.
    pub fn grant(
        &self,
        purchase_id: AggregateId,
        items: Vec<CatalogItemRef>,
    ) -> Result<Vec<LibraryEvent>, CommerceError> {
        self.ensure_open()?;

        let mut new_items: Vec<CatalogItemRef> = Vec::with_capacity(items.len());
        for item in items {
            if !self.contains(item.game_id) && !new_items.iter().any(|i| i.game_id == item.game_id)
            {
                new_items.push(item);
            }
        }

        if new_items.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![LibraryEvent::granted(purchase_id, new_items)])
    }

    /// Revokes the given games. Games not owned are skipped.
    pub fn revoke(
        &self,
        purchase_id: AggregateId,
        game_ids: &[GameId],
    ) -> Result<Vec<LibraryEvent>, CommerceError> {
        self.ensure_open()?;

        let owned: Vec<GameId> = game_ids
            .iter()
            .copied()
            .filter(|id| self.contains(*id))
            .collect();

        if owned.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![LibraryEvent::revoked(purchase_id, owned)])
    }
}
