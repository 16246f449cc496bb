//! HTTP handlers, one module per resource.

pub mod cart;
pub mod games;
pub mod library;
pub mod ops;
pub mod purchases;
pub mod users;
pub mod wallet;

use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use domain::CatalogItemRef;

/// Parses a path or body identifier into one of the UUID newtypes.
pub(crate) fn parse_id<T: From<Uuid>>(raw: &str, what: &str) -> Result<T, ApiError> {
    Uuid::parse_str(raw)
        .map(T::from)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {what} ID: {e}")))
}

/// A game as it appears in carts and purchases.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub game_id: String,
    pub name: String,
    pub price_cents: i64,
}

impl From<&CatalogItemRef> for ItemResponse {
    fn from(item: &CatalogItemRef) -> Self {
        Self {
            game_id: item.game_id.to_string(),
            name: item.name.clone(),
            price_cents: item.price.cents(),
        }
    }
}
