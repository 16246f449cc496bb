//! Cart domain events.

use common::{AggregateId, GameId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::CatalogItemRef;

/// Events that can occur on a cart aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    CartOpened(CartOpenedData),
    ItemAdded(ItemAddedData),
    ItemRemoved(ItemRemovedData),

    /// Checkout moved every item into a purchase.
    CartCleared(CartClearedData),
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::CartOpened(_) => "CartOpened",
            CartEvent::ItemAdded(_) => "ItemAdded",
            CartEvent::ItemRemoved(_) => "ItemRemoved",
            CartEvent::CartCleared(_) => "CartCleared",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartOpenedData {
    pub cart_id: AggregateId,
    pub owner: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAddedData {
    /// The game, priced at the time it was added.
    pub item: CatalogItemRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRemovedData {
    pub game_id: GameId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartClearedData {
    pub purchase_id: AggregateId,
}

impl CartEvent {
    pub fn opened(cart_id: AggregateId, owner: UserId) -> Self {
        CartEvent::CartOpened(CartOpenedData { cart_id, owner })
    }

    pub fn item_added(item: CatalogItemRef) -> Self {
        CartEvent::ItemAdded(ItemAddedData { item })
    }

    pub fn item_removed(game_id: GameId) -> Self {
        CartEvent::ItemRemoved(ItemRemovedData { game_id })
    }

    pub fn cleared(purchase_id: AggregateId) -> Self {
        CartEvent::CartCleared(CartClearedData { purchase_id })
    }
}
