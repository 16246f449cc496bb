//! Checkout: turns a user's cart into a purchase.
//!
//! ```text
//! Validating ──┬──► Committing ──► Done
//!              └──► Rejected
//! ```
//!
//! Validation reads the wallet, cart and library once under the user's lock.
//! The purchase record, wallet debit, library grant and cart clear are then
//! committed as a single append, so either all four land or none do.

use std::sync::Arc;
use std::time::Instant;

use common::{AggregateId, UserId};
use domain::{
    Aggregate, Cart, CommerceError, DomainError, Library, PurchaseRecord, UnitOfWork,
    UserDirectory, Wallet,
};
use event_store::{EventStore, Version};
use serde::Serialize;

use crate::Result;
use crate::context::StoreContext;

/// Where a checkout is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum CheckoutPhase {
    /// Reading the cart, library and wallet.
    #[default]
    Validating,

    /// Appending the purchase and its effects.
    Committing,

    /// The purchase was recorded (terminal state).
    Done,

    /// A business rule or the commit failed. Nothing was written (terminal state).
    Rejected,
}

impl CheckoutPhase {
    pub fn can_commit(&self) -> bool {
        matches!(self, CheckoutPhase::Validating)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutPhase::Done | CheckoutPhase::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Validating => "Validating",
            CheckoutPhase::Committing => "Committing",
            CheckoutPhase::Done => "Done",
            CheckoutPhase::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checks a cart against the user's library and wallet.
///
/// Rules run in order and the first failure wins: an empty cart, then a game
/// the user already owns, then a balance below the cart total.
pub fn validate(
    cart: &Cart,
    library: &Library,
    wallet: &Wallet,
) -> std::result::Result<(), CommerceError> {
    if cart.is_empty() {
        return Err(CommerceError::EmptyCart);
    }
    if let Some(owned) = cart.items().iter().find(|item| library.contains(item.game_id)) {
        return Err(CommerceError::AlreadyOwned {
            name: owned.name.clone(),
        });
    }
    let required = cart.total();
    if wallet.balance() < required {
        return Err(CommerceError::InsufficientFunds {
            balance: wallet.balance(),
            required,
        });
    }
    Ok(())
}

fn rejection_reason(err: &DomainError) -> &'static str {
    match err.as_commerce() {
        Some(commerce) => commerce.kind(),
        None if err.is_conflict() => "conflict",
        None => "store_error",
    }
}

pub struct CheckoutCoordinator<S: EventStore, U> {
    ctx: Arc<StoreContext<S, U>>,
}

impl<S, U> CheckoutCoordinator<S, U>
where
    S: EventStore,
    U: UserDirectory,
{
    pub fn new(ctx: Arc<StoreContext<S, U>>) -> Self {
        Self { ctx }
    }

    /// Buys everything in the user's cart and returns the new purchase record.
    #[tracing::instrument(skip(self), fields(phase = tracing::field::Empty))]
    pub async fn checkout(&self, user_id: UserId) -> Result<PurchaseRecord> {
        let started = Instant::now();
        let result = self.run(user_id).await;
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(purchase) => {
                enter(CheckoutPhase::Done);
                metrics::counter!("checkout_total").increment(1);
                tracing::info!(
                    purchase_id = ?purchase.id(),
                    amount = %purchase.amount(),
                    items = purchase.items().len(),
                    "checkout completed"
                );
            }
            Err(err) => {
                enter(CheckoutPhase::Rejected);
                metrics::counter!("checkout_rejected_total", "reason" => rejection_reason(err))
                    .increment(1);
                tracing::warn!(error = %err, "checkout rejected");
            }
        }
        result
    }

    async fn run(&self, user_id: UserId) -> Result<PurchaseRecord> {
        let user = self.ctx.user(user_id).await?;
        let _guard = self.ctx.locks.acquire(user_id).await;

        enter(CheckoutPhase::Validating);
        let cart = self.ctx.cart(&user).await?;
        let library = self.ctx.library(&user).await?;
        let wallet = self.ctx.wallet(&user).await?;
        validate(&cart, &library, &wallet)?;

        enter(CheckoutPhase::Committing);
        let purchase_id = AggregateId::new();
        let items = cart.items().to_vec();
        let amount = cart.total();

        let mut purchase = PurchaseRecord::default();
        let purchase_events = purchase.complete(purchase_id, user_id, items.clone(), amount)?;

        let mut uow = UnitOfWork::new();
        uow.stage(purchase_id, &purchase, &purchase_events)?;
        uow.stage(user.wallet_id, &wallet, &wallet.debit(purchase_id, amount)?)?;
        uow.stage(user.library_id, &library, &library.grant(purchase_id, items)?)?;
        uow.stage(user.cart_id, &cart, &cart.clear(purchase_id)?)?;
        let versions = uow.commit(&self.ctx.store).await?;

        purchase.apply_events(purchase_events);
        purchase.set_version(versions.first().copied().unwrap_or_else(Version::first));
        Ok(purchase)
    }
}

fn enter(phase: CheckoutPhase) {
    tracing::Span::current().record("phase", phase.as_str());
    tracing::debug!(%phase, "checkout phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::GameId;
    use domain::{CatalogItemRef, Money};

    fn game(name: &str, cents: i64) -> CatalogItemRef {
        CatalogItemRef::new(GameId::new(), name, Money::from_cents(cents))
    }

    fn opened(owner: UserId) -> (Cart, Library, Wallet) {
        let mut cart = Cart::default();
        cart.apply_events(cart.open(AggregateId::new(), owner).unwrap());
        let mut library = Library::default();
        library.apply_events(library.open(AggregateId::new(), owner).unwrap());
        let mut wallet = Wallet::default();
        wallet.apply_events(wallet.open(AggregateId::new(), owner).unwrap());
        (cart, library, wallet)
    }

    fn fund(wallet: &mut Wallet, cents: i64) {
        wallet.apply_events(wallet.deposit(Money::from_cents(cents)).unwrap());
    }

    fn add(cart: &mut Cart, library: &Library, item: CatalogItemRef) {
        cart.apply_events(cart.add_item(item, library).unwrap());
    }

    #[test]
    fn test_empty_cart_is_rejected_first() {
        let (cart, library, wallet) = opened(UserId::new());
        assert_eq!(validate(&cart, &library, &wallet), Err(CommerceError::EmptyCart));
    }

    #[test]
    fn test_owned_game_is_rejected_before_funds() {
        let (mut cart, mut library, wallet) = opened(UserId::new());
        let hades = game("Hades", 4000);
        add(&mut cart, &library, hades.clone());
        library.apply_events(library.grant(AggregateId::new(), vec![hades]).unwrap());

        assert_eq!(
            validate(&cart, &library, &wallet),
            Err(CommerceError::AlreadyOwned {
                name: "Hades".to_string()
            })
        );
    }

    #[test]
    fn test_insufficient_funds_carries_balance_and_total() {
        let (mut cart, library, mut wallet) = opened(UserId::new());
        fund(&mut wallet, 1000);
        add(&mut cart, &library, game("Hades", 4000));
        add(&mut cart, &library, game("Celeste", 3000));

        assert_eq!(
            validate(&cart, &library, &wallet),
            Err(CommerceError::InsufficientFunds {
                balance: Money::from_cents(1000),
                required: Money::from_cents(7000),
            })
        );
    }

    #[test]
    fn test_exact_balance_passes() {
        let (mut cart, library, mut wallet) = opened(UserId::new());
        fund(&mut wallet, 7000);
        add(&mut cart, &library, game("Hades", 4000));
        add(&mut cart, &library, game("Celeste", 3000));

        assert_eq!(validate(&cart, &library, &wallet), Ok(()));
    }

    #[test]
    fn test_phase_transitions() {
        assert_eq!(CheckoutPhase::default(), CheckoutPhase::Validating);
        assert!(CheckoutPhase::Validating.can_commit());
        assert!(!CheckoutPhase::Committing.can_commit());
        assert!(!CheckoutPhase::Rejected.can_commit());
        assert!(CheckoutPhase::Done.is_terminal());
        assert!(CheckoutPhase::Rejected.is_terminal());
        assert!(!CheckoutPhase::Committing.is_terminal());
        assert_eq!(CheckoutPhase::Committing.to_string(), "Committing");
    }

    #[test]
    fn test_rejection_reason_labels() {
        let empty: DomainError = CommerceError::EmptyCart.into();
        assert_eq!(rejection_reason(&empty), "empty_cart");

        let conflict: DomainError = event_store::EventStoreError::ConcurrencyConflict {
            aggregate_id: AggregateId::new(),
            expected: Version::first(),
            actual: Version::new(2),
        }
        .into();
        assert_eq!(rejection_reason(&conflict), "conflict");
    }
}
