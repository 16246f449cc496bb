//! Library domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, GameId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::CatalogItemRef;

/// Events that can occur on a library aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LibraryEvent {
    LibraryOpened(LibraryOpenedData),

    /// A checkout handed over ownership.
    GamesGranted(GamesGrantedData),

    /// A refund took ownership back.
    GamesRevoked(GamesRevokedData),
}

impl DomainEvent for LibraryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LibraryEvent::LibraryOpened(_) => "LibraryOpened",
            LibraryEvent::GamesGranted(_) => "GamesGranted",
            LibraryEvent::GamesRevoked(_) => "GamesRevoked",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryOpenedData {
    pub library_id: AggregateId,
    pub owner: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesGrantedData {
    pub purchase_id: AggregateId,

    /// Only the games that were not owned yet.
    pub items: Vec<CatalogItemRef>,
    pub granted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesRevokedData {
    pub purchase_id: AggregateId,

    /// Only the games that were owned at revocation time.
    pub game_ids: Vec<GameId>,
}

impl LibraryEvent {
    pub fn opened(library_id: AggregateId, owner: UserId) -> Self {
        LibraryEvent::LibraryOpened(LibraryOpenedData { library_id, owner })
    }

    pub fn granted(purchase_id: AggregateId, items: Vec<CatalogItemRef>) -> Self {
        LibraryEvent::GamesGranted(GamesGrantedData {
            purchase_id,
            items,
            granted_at: Utc::now(),
        })
    }

    pub fn revoked(purchase_id: AggregateId, game_ids: Vec<GameId>) -> Self {
        LibraryEvent::GamesRevoked(GamesRevokedData {
            purchase_id,
            game_ids,
        })
    }
}
