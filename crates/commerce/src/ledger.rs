//! Wallet ledger: deposits and balance reads.
//!
//! Debits and credits happen only inside checkout and refund commits.

use std::sync::Arc;

use common::UserId;
use domain::{Money, UserDirectory};
use event_store::EventStore;

use crate::Result;
use crate::context::StoreContext;

pub struct WalletLedger<S: EventStore, U> {
    ctx: Arc<StoreContext<S, U>>,
}

impl<S, U> WalletLedger<S, U>
where
    S: EventStore,
    U: UserDirectory,
{
    pub fn new(ctx: Arc<StoreContext<S, U>>) -> Self {
        Self { ctx }
    }

    /// Adds `amount` to the user's wallet and returns the new balance.
    #[tracing::instrument(skip(self), fields(amount = %amount))]
    pub async fn deposit(&self, user_id: UserId, amount: Money) -> Result<Money> {
        let user = self.ctx.user(user_id).await?;
        let _guard = self.ctx.locks.acquire(user_id).await;

        let result = self
            .ctx
            .wallets
            .execute(user.wallet_id, |wallet| wallet.deposit(amount))
            .await?;

        let balance = result.aggregate.balance();
        metrics::counter!("deposit_total").increment(1);
        tracing::info!(%balance, "funds deposited");
        Ok(balance)
    }

    pub async fn balance(&self, user_id: UserId) -> Result<Money> {
        let user = self.ctx.user(user_id).await?;
        Ok(self.ctx.wallet(&user).await?.balance())
    }
}
