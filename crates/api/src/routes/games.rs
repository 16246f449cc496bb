//! Catalog management.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use common::GameId;
use domain::{CatalogItem, GameUpdate, Money, NewGame};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
    pub price_cents: i64,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
}

impl From<CreateGameRequest> for NewGame {
    fn from(req: CreateGameRequest) -> Self {
        NewGame {
            name: req.name,
            price: Money::from_cents(req.price_cents),
            genre: req.genre,
            description: req.description,
            release_date: req.release_date,
            rating: req.rating,
            image_url: req.image_url,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateGameRequest {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

impl From<UpdateGameRequest> for GameUpdate {
    fn from(req: UpdateGameRequest) -> Self {
        GameUpdate {
            name: req.name,
            genre: req.genre,
            price: req.price_cents.map(Money::from_cents),
            description: req.description,
            release_date: req.release_date,
            rating: req.rating,
            image_url: req.image_url,
            active: req.active,
        }
    }
}

#[derive(Serialize)]
pub struct GameResponse {
    pub id: String,
    pub name: String,
    pub genre: String,
    pub price_cents: i64,
    pub description: String,
    pub release_date: NaiveDate,
    pub rating: f64,
    pub image_url: String,
    pub active: bool,
}

impl From<CatalogItem> for GameResponse {
    fn from(game: CatalogItem) -> Self {
        Self {
            id: game.id.to_string(),
            name: game.name,
            genre: game.genre,
            price_cents: game.price.cents(),
            description: game.description,
            release_date: game.release_date,
            rating: game.rating,
            image_url: game.image_url,
            active: game.active,
        }
    }
}

/// GET /games
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<GameResponse>> {
    let games = state.catalog.list().await;
    Json(games.into_iter().map(GameResponse::from).collect())
}

/// POST /games
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let game = state.catalog.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

/// GET /games/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game_id: GameId = parse_id(&id, "game")?;
    let game = state.catalog.get(game_id).await?;
    Ok(Json(game.into()))
}

/// PUT /games/:id: update the fields present in the body.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateGameRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let game_id: GameId = parse_id(&id, "game")?;
    let game = state.catalog.update(game_id, req.into()).await?;
    Ok(Json(game.into()))
}

/// DELETE /games/:id
#[tracing::instrument(skip(state))]
pub async fn delete<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let game_id: GameId = parse_id(&id, "game")?;
    state.catalog.delete(game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
