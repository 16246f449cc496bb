//! The game catalog, as seen by the store.

mod memory;
pub mod validation;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::GameId;
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::value_objects::{CatalogItemRef, Money};

pub use memory::InMemoryCatalog;

/// A game listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: GameId,
    pub name: String,
    pub genre: String,
    pub price: Money,
    pub description: String,
    pub release_date: NaiveDate,
    pub rating: f64,
    pub image_url: String,
    pub active: bool,
}

impl CatalogItem {
    /// The reference carts and libraries hold, priced as of now.
    pub fn to_ref(&self) -> CatalogItemRef {
        CatalogItemRef::new(self.id, self.name.clone(), self.price)
    }
}

/// Input for creating a game. Optional fields are filled in by
/// [`validation::normalize_optional_fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewGame {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewGame {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    /// Converts a validated game into a catalog entry.
    fn into_item(self, id: GameId) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            genre: self.genre.unwrap_or_default(),
            price: self.price,
            description: self.description.unwrap_or_default(),
            release_date: self
                .release_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
            rating: self.rating.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            active: true,
        }
    }
}

/// Partial update of a game. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameUpdate {
    /// Ignored when blank.
    pub name: Option<String>,
    /// Ignored when blank.
    pub genre: Option<String>,
    pub price: Option<Money>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    /// An empty string clears the image.
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

/// Catalog lookup used when games go into a cart.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolves a game to the reference stored in carts and libraries.
    async fn find_item(&self, game_id: GameId) -> Result<CatalogItemRef, CommerceError>;
}
