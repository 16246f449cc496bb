//! Cart editing.

use std::sync::Arc;

use common::{GameId, UserId};
use domain::{Cart, Catalog, UserDirectory};
use event_store::EventStore;

use crate::Result;
use crate::context::StoreContext;

pub struct CartService<S: EventStore, C, U> {
    ctx: Arc<StoreContext<S, U>>,
    catalog: Arc<C>,
}

impl<S, C, U> CartService<S, C, U>
where
    S: EventStore,
    C: Catalog,
    U: UserDirectory,
{
    pub fn new(ctx: Arc<StoreContext<S, U>>, catalog: Arc<C>) -> Self {
        Self { ctx, catalog }
    }

    /// Adds a catalog game to the user's cart.
    ///
    /// Fails if the game is already in the cart or already in the library.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(&self, user_id: UserId, game_id: GameId) -> Result<Cart> {
        let user = self.ctx.user(user_id).await?;
        let item = self.catalog.find_item(game_id).await?;
        let _guard = self.ctx.locks.acquire(user_id).await;

        let library = self.ctx.library(&user).await?;
        let result = self
            .ctx
            .carts
            .execute(user.cart_id, |cart| cart.add_item(item, &library))
            .await?;

        tracing::debug!(total = %result.aggregate.total(), "game added to cart");
        Ok(result.aggregate)
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, game_id: GameId) -> Result<Cart> {
        let user = self.ctx.user(user_id).await?;
        let _guard = self.ctx.locks.acquire(user_id).await;

        let result = self
            .ctx
            .carts
            .execute(user.cart_id, |cart| cart.remove_item(game_id))
            .await?;

        tracing::debug!(total = %result.aggregate.total(), "game removed from cart");
        Ok(result.aggregate)
    }

    pub async fn cart(&self, user_id: UserId) -> Result<Cart> {
        let user = self.ctx.user(user_id).await?;
        self.ctx.cart(&user).await
    }
}
