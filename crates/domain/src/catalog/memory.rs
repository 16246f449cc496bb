use std::sync::Arc;

use async_trait::async_trait;
use common::GameId;
use tokio::sync::RwLock;

use crate::error::CommerceError;
use crate::value_objects::CatalogItemRef;

use super::validation::{check_price, normalize_image_url, normalize_rating, validate_new_game};
use super::{Catalog, CatalogItem, GameUpdate, NewGame};

/// In-memory catalog, listed in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    games: Arc<RwLock<Vec<CatalogItem>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and lists a new game. Names must be unique.
    #[tracing::instrument(skip(self, game), fields(name = %game.name))]
    pub async fn create(&self, game: NewGame) -> Result<CatalogItem, CommerceError> {
        let game = validate_new_game(game)?;

        let mut games = self.games.write().await;
        if games.iter().any(|g| g.name == game.name) {
            return Err(CommerceError::GameAlreadyExists { name: game.name });
        }

        let item = game.into_item(GameId::new());
        games.push(item.clone());
        tracing::info!(game_id = %item.id, "game listed");
        Ok(item)
    }

    pub async fn get(&self, game_id: GameId) -> Result<CatalogItem, CommerceError> {
        self.games
            .read()
            .await
            .iter()
            .find(|g| g.id == game_id)
            .cloned()
            .ok_or_else(|| CommerceError::not_found("Game", game_id))
    }

    pub async fn list(&self) -> Vec<CatalogItem> {
        self.games.read().await.clone()
    }

    /// Applies the fields present in `update`.
    ///
    /// Nothing changes if any field is rejected.
    pub async fn update(
        &self,
        game_id: GameId,
        update: GameUpdate,
    ) -> Result<CatalogItem, CommerceError> {
        let mut games = self.games.write().await;

        let name = update
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if let Some(name) = name
            && games.iter().any(|g| g.name == name && g.id != game_id)
        {
            return Err(CommerceError::GameAlreadyExists {
                name: name.to_string(),
            });
        }
        if let Some(price) = update.price {
            check_price(price)?;
        }
        let image_url = update
            .image_url
            .as_deref()
            .map(normalize_image_url)
            .transpose()?;

        let game = games
            .iter_mut()
            .find(|g| g.id == game_id)
            .ok_or_else(|| CommerceError::not_found("Game", game_id))?;

        if let Some(name) = name {
            game.name = name.to_string();
        }
        if let Some(genre) = update.genre.filter(|g| !g.trim().is_empty()) {
            game.genre = genre;
        }
        if let Some(price) = update.price {
            game.price = price;
        }
        if let Some(description) = update.description {
            game.description = description;
        }
        if let Some(release_date) = update.release_date {
            game.release_date = release_date;
        }
        if let Some(rating) = update.rating {
            game.rating = normalize_rating(rating);
        }
        if let Some(image_url) = image_url {
            game.image_url = image_url;
        }
        if let Some(active) = update.active {
            game.active = active;
        }

        Ok(game.clone())
    }

    pub async fn delete(&self, game_id: GameId) -> Result<(), CommerceError> {
        let mut games = self.games.write().await;
        let before = games.len();
        games.retain(|g| g.id != game_id);
        if games.len() == before {
            return Err(CommerceError::not_found("Game", game_id));
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn find_item(&self, game_id: GameId) -> Result<CatalogItemRef, CommerceError> {
        self.get(game_id).await.map(|game| game.to_ref())
    }
}
