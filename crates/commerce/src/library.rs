//! Library reads.

use std::sync::Arc;

use common::{GameId, UserId};
use domain::{Library, UserDirectory};
use event_store::EventStore;

use crate::Result;
use crate::context::StoreContext;

pub struct LibraryService<S: EventStore, U> {
    ctx: Arc<StoreContext<S, U>>,
}

impl<S, U> LibraryService<S, U>
where
    S: EventStore,
    U: UserDirectory,
{
    pub fn new(ctx: Arc<StoreContext<S, U>>) -> Self {
        Self { ctx }
    }

    pub async fn library(&self, user_id: UserId) -> Result<Library> {
        let user = self.ctx.user(user_id).await?;
        self.ctx.library(&user).await
    }

    pub async fn owns(&self, user_id: UserId, game_id: GameId) -> Result<bool> {
        Ok(self.library(user_id).await?.contains(game_id))
    }
}
