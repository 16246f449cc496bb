//! All store services over one shared context.

use std::sync::Arc;

use domain::{Catalog, UserDirectory};
use event_store::EventStore;

use crate::accounts::AccountService;
use crate::cart::CartService;
use crate::checkout::CheckoutCoordinator;
use crate::context::StoreContext;
use crate::ledger::WalletLedger;
use crate::library::LibraryService;
use crate::refund::RefundCoordinator;

/// Entry point for every user-facing store operation.
///
/// The services share one event store, one user directory and one set of
/// per-user locks.
pub struct Storefront<S: EventStore, C, U> {
    ctx: Arc<StoreContext<S, U>>,
    catalog: Arc<C>,
    accounts: AccountService<S, U>,
    ledger: WalletLedger<S, U>,
    carts: CartService<S, C, U>,
    libraries: LibraryService<S, U>,
    checkout: CheckoutCoordinator<S, U>,
    refunds: RefundCoordinator<S, U>,
}

impl<S, C, U> Storefront<S, C, U>
where
    S: EventStore + Clone,
    C: Catalog,
    U: UserDirectory,
{
    pub fn new(store: S, catalog: Arc<C>, users: Arc<U>) -> Self {
        let ctx = Arc::new(StoreContext::new(store, users));
        Self {
            accounts: AccountService::new(Arc::clone(&ctx)),
            ledger: WalletLedger::new(Arc::clone(&ctx)),
            carts: CartService::new(Arc::clone(&ctx), Arc::clone(&catalog)),
            libraries: LibraryService::new(Arc::clone(&ctx)),
            checkout: CheckoutCoordinator::new(Arc::clone(&ctx)),
            refunds: RefundCoordinator::new(Arc::clone(&ctx)),
            catalog,
            ctx,
        }
    }
}

impl<S, C, U> Storefront<S, C, U>
where
    S: EventStore,
    C: Catalog,
    U: UserDirectory,
{
    pub fn context(&self) -> &StoreContext<S, U> {
        &self.ctx
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn accounts(&self) -> &AccountService<S, U> {
        &self.accounts
    }

    pub fn ledger(&self) -> &WalletLedger<S, U> {
        &self.ledger
    }

    pub fn carts(&self) -> &CartService<S, C, U> {
        &self.carts
    }

    pub fn libraries(&self) -> &LibraryService<S, U> {
        &self.libraries
    }

    pub fn checkout(&self) -> &CheckoutCoordinator<S, U> {
        &self.checkout
    }

    pub fn refunds(&self) -> &RefundCoordinator<S, U> {
        &self.refunds
    }
}
