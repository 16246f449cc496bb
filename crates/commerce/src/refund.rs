//! Refund: reverses a completed purchase.
//!
//! The wallet credit, library revocation and refunded flag are committed as
//! one append. The cart is left alone.

use std::sync::Arc;

use common::AggregateId;
use domain::{Aggregate, CommerceError, PurchaseRecord, UnitOfWork, UserDirectory};
use event_store::EventStore;

use crate::Result;
use crate::context::StoreContext;

pub struct RefundCoordinator<S: EventStore, U> {
    ctx: Arc<StoreContext<S, U>>,
}

impl<S, U> RefundCoordinator<S, U>
where
    S: EventStore,
    U: UserDirectory,
{
    pub fn new(ctx: Arc<StoreContext<S, U>>) -> Self {
        Self { ctx }
    }

    pub async fn get_purchase(&self, purchase_id: AggregateId) -> Result<PurchaseRecord> {
        self.ctx.purchase(purchase_id).await
    }

    /// Refunds a purchase and returns the updated record.
    ///
    /// Every game in the purchase is revoked from the owner's library, even
    /// if a later purchase granted the same game again.
    #[tracing::instrument(skip(self))]
    pub async fn refund(&self, purchase_id: AggregateId) -> Result<PurchaseRecord> {
        let owner = self
            .ctx
            .purchase(purchase_id)
            .await?
            .owner()
            .ok_or_else(|| CommerceError::not_found("Purchase", purchase_id))?;
        let user = self.ctx.user(owner).await?;
        let _guard = self.ctx.locks.acquire(owner).await;

        // Re-read under the lock; a concurrent refund may have just landed.
        let mut purchase = self.ctx.purchase(purchase_id).await?;
        let refund_events = purchase.refund().inspect_err(|err| {
            tracing::warn!(error = %err, "refund rejected");
        })?;

        let wallet = self.ctx.wallet(&user).await?;
        let library = self.ctx.library(&user).await?;
        let amount = purchase.amount();

        let mut uow = UnitOfWork::new();
        uow.stage(user.wallet_id, &wallet, &wallet.credit(purchase_id, amount)?)?;
        uow.stage(
            user.library_id,
            &library,
            &library.revoke(purchase_id, &purchase.game_ids())?,
        )?;
        uow.stage(purchase_id, &purchase, &refund_events)?;
        let versions = uow.commit(&self.ctx.store).await?;

        let version = versions.last().copied().unwrap_or_else(|| purchase.version());
        purchase.apply_events(refund_events);
        purchase.set_version(version);

        metrics::counter!("refund_total").increment(1);
        tracing::info!(%owner, %amount, "purchase refunded");
        Ok(purchase)
    }
}
