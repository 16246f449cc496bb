//! State shared by every store service.

use std::sync::Arc;

use common::{AggregateId, UserId};
use domain::{
    Cart, CommandHandler, CommerceError, Library, PurchaseRecord, UserDirectory, UserRef, Wallet,
};
use event_store::EventStore;

use crate::Result;
use crate::locks::UserLocks;

/// The event store, the user directory, the per-user locks and one command
/// handler per aggregate type.
pub struct StoreContext<S: EventStore, U> {
    pub(crate) store: S,
    pub(crate) users: Arc<U>,
    pub(crate) locks: UserLocks,
    pub(crate) wallets: CommandHandler<S, Wallet>,
    pub(crate) carts: CommandHandler<S, Cart>,
    pub(crate) libraries: CommandHandler<S, Library>,
    pub(crate) purchases: CommandHandler<S, PurchaseRecord>,
}

impl<S, U> StoreContext<S, U>
where
    S: EventStore + Clone,
    U: UserDirectory,
{
    pub fn new(store: S, users: Arc<U>) -> Self {
        Self {
            wallets: CommandHandler::new(store.clone()),
            carts: CommandHandler::new(store.clone()),
            libraries: CommandHandler::new(store.clone()),
            purchases: CommandHandler::new(store.clone()),
            store,
            users,
            locks: UserLocks::new(),
        }
    }
}

impl<S, U> StoreContext<S, U>
where
    S: EventStore,
    U: UserDirectory,
{
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn locks(&self) -> &UserLocks {
        &self.locks
    }

    pub(crate) async fn user(&self, user_id: UserId) -> Result<UserRef> {
        Ok(self.users.find_user(user_id).await?)
    }

    pub(crate) async fn wallet(&self, user: &UserRef) -> Result<Wallet> {
        self.wallets
            .load_existing(user.wallet_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Wallet", user.id).into())
    }

    pub(crate) async fn cart(&self, user: &UserRef) -> Result<Cart> {
        self.carts
            .load_existing(user.cart_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Cart", user.id).into())
    }

    pub(crate) async fn library(&self, user: &UserRef) -> Result<Library> {
        self.libraries
            .load_existing(user.library_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Library", user.id).into())
    }

    pub(crate) async fn purchase(&self, purchase_id: AggregateId) -> Result<PurchaseRecord> {
        self.purchases
            .load_existing(purchase_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Purchase", purchase_id).into())
    }
}
