//! Owned games.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use event_store::EventStore;
use serde::Serialize;

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct LibraryResponse {
    pub user_id: String,
    pub games: Vec<OwnedGameResponse>,
}

#[derive(Serialize)]
pub struct OwnedGameResponse {
    pub game_id: String,
    pub name: String,
    pub purchase_id: String,
    pub acquired_at: String,
}

/// GET /users/:id/library
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<LibraryResponse>, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let library = state.store.libraries().library(user_id).await?;

    let games = library
        .entries()
        .iter()
        .map(|entry| OwnedGameResponse {
            game_id: entry.item.game_id.to_string(),
            name: entry.item.name.clone(),
            purchase_id: entry.purchase_id.to_string(),
            acquired_at: entry.acquired_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(LibraryResponse {
        user_id: id,
        games,
    }))
}
