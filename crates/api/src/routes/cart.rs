//! Cart contents.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{GameId, UserId};
use domain::Cart;
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::{ItemResponse, parse_id};
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub game_id: String,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<ItemResponse>,
    pub total_cents: i64,
}

impl CartResponse {
    fn new(user_id: String, cart: &Cart) -> Self {
        Self {
            user_id,
            items: cart.items().iter().map(ItemResponse::from).collect(),
            total_cents: cart.total().cents(),
        }
    }
}

/// GET /users/:id/cart
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let cart = state.store.carts().cart(user_id).await?;
    Ok(Json(CartResponse::new(id, &cart)))
}

/// POST /users/:id/cart/items
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let game_id: GameId = parse_id(&req.game_id, "game")?;
    let cart = state.store.carts().add_item(user_id, game_id).await?;
    Ok(Json(CartResponse::new(id, &cart)))
}

/// DELETE /users/:id/cart/items/:game_id
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, game_id)): Path<(String, String)>,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let game_id: GameId = parse_id(&game_id, "game")?;
    let cart = state.store.carts().remove_item(user_id, game_id).await?;
    Ok(Json(CartResponse::new(id, &cart)))
}
