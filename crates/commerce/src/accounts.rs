//! User registration.

use std::sync::Arc;

use common::{AggregateId, UserId};
use domain::{Cart, CommerceError, Library, UnitOfWork, UserDirectory, UserRef, Wallet};
use event_store::EventStore;

use crate::Result;
use crate::context::StoreContext;

pub struct AccountService<S: EventStore, U> {
    ctx: Arc<StoreContext<S, U>>,
}

impl<S, U> AccountService<S, U>
where
    S: EventStore,
    U: UserDirectory,
{
    pub fn new(ctx: Arc<StoreContext<S, U>>) -> Self {
        Self { ctx }
    }

    /// Registers a user and opens an empty wallet, cart and library for them.
    ///
    /// The three aggregates are opened in one commit. The user is published
    /// to the directory only after that commit succeeds.
    #[tracing::instrument(skip(self, name, email))]
    pub async fn register(&self, name: &str, email: &str) -> Result<UserRef> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(CommerceError::invalid_input("name is required").into());
        }
        if email.is_empty() || !email.contains('@') {
            return Err(CommerceError::invalid_input(format!("invalid email: '{email}'")).into());
        }
        if self.ctx.users.find_by_email(email).await.is_some() {
            return Err(
                CommerceError::invalid_input(format!("email already registered: {email}")).into(),
            );
        }

        let user = UserRef {
            id: UserId::new(),
            name: name.to_string(),
            email: email.to_string(),
            wallet_id: AggregateId::new(),
            cart_id: AggregateId::new(),
            library_id: AggregateId::new(),
        };

        let mut uow = UnitOfWork::new();
        let wallet = Wallet::default();
        uow.stage(user.wallet_id, &wallet, &wallet.open(user.wallet_id, user.id)?)?;
        let cart = Cart::default();
        uow.stage(user.cart_id, &cart, &cart.open(user.cart_id, user.id)?)?;
        let library = Library::default();
        uow.stage(
            user.library_id,
            &library,
            &library.open(user.library_id, user.id)?,
        )?;
        uow.commit(&self.ctx.store).await?;

        self.ctx.users.insert(user.clone()).await?;

        metrics::counter!("users_registered_total").increment(1);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn find(&self, user_id: UserId) -> Result<UserRef> {
        self.ctx.user(user_id).await
    }
}
