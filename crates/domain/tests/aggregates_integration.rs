//! Integration tests for the store aggregates.
//!
//! These tests persist aggregates through the event store, rebuild them by
//! replay, and exercise multi-aggregate commits and version conflicts.

use common::{AggregateId, GameId, UserId};
use domain::{
    Aggregate, Cart, CatalogItemRef, CommandHandler, CommerceError, DomainError, Library, Money,
    PurchaseRecord, UnitOfWork, Wallet,
};
use event_store::{EventStore, EventStoreError, InMemoryEventStore, Version};

struct Fixture {
    store: InMemoryEventStore,
    wallets: CommandHandler<InMemoryEventStore, Wallet>,
    carts: CommandHandler<InMemoryEventStore, Cart>,
    libraries: CommandHandler<InMemoryEventStore, Library>,
    purchases: CommandHandler<InMemoryEventStore, PurchaseRecord>,
    owner: UserId,
    wallet_id: AggregateId,
    cart_id: AggregateId,
    library_id: AggregateId,
}

async fn open_accounts() -> Fixture {
    let store = InMemoryEventStore::new();
    let owner = UserId::new();
    let (wallet_id, cart_id, library_id) =
        (AggregateId::new(), AggregateId::new(), AggregateId::new());

    let mut uow = UnitOfWork::new();
    let wallet = Wallet::default();
    uow.stage(wallet_id, &wallet, &wallet.open(wallet_id, owner).unwrap())
        .unwrap();
    let cart = Cart::default();
    uow.stage(cart_id, &cart, &cart.open(cart_id, owner).unwrap())
        .unwrap();
    let library = Library::default();
    uow.stage(library_id, &library, &library.open(library_id, owner).unwrap())
        .unwrap();
    uow.commit(&store).await.unwrap();

    Fixture {
        wallets: CommandHandler::new(store.clone()),
        carts: CommandHandler::new(store.clone()),
        libraries: CommandHandler::new(store.clone()),
        purchases: CommandHandler::new(store.clone()),
        store,
        owner,
        wallet_id,
        cart_id,
        library_id,
    }
}

fn game(name: &str, cents: i64) -> CatalogItemRef {
    CatalogItemRef::new(GameId::new(), name, Money::from_cents(cents))
}

mod replay {
    use super::*;

    #[tokio::test]
    async fn opened_accounts_share_one_commit() {
        let f = open_accounts().await;

        let mut commit_ids = Vec::new();
        for id in [f.wallet_id, f.cart_id, f.library_id] {
            let events = f.store.get_events_for_aggregate(id).await.unwrap();
            assert_eq!(events.len(), 1);
            commit_ids.push(events[0].commit_id().unwrap().to_string());
        }
        commit_ids.dedup();
        assert_eq!(commit_ids.len(), 1);

        let wallet = f.wallets.load(f.wallet_id).await.unwrap();
        assert_eq!(wallet.owner(), Some(f.owner));
        assert_eq!(wallet.balance(), Money::zero());
    }

    #[tokio::test]
    async fn cart_total_survives_replay() {
        let f = open_accounts().await;
        let library = f.libraries.load(f.library_id).await.unwrap();
        let hades = game("Hades", 4000);
        let celeste = game("Celeste", 3000);

        for item in [hades.clone(), celeste.clone()] {
            f.carts
                .execute(f.cart_id, |cart| cart.add_item(item, &library))
                .await
                .unwrap();
        }
        f.carts
            .execute(f.cart_id, |cart| cart.remove_item(hades.game_id))
            .await
            .unwrap();

        let cart = f.carts.load(f.cart_id).await.unwrap();
        assert_eq!(cart.items(), &[celeste]);
        assert_eq!(cart.total(), Money::from_cents(3000));
        assert_eq!(cart.version(), Version::new(4));
    }

    #[tokio::test]
    async fn purchase_refund_survives_replay() {
        let f = open_accounts().await;
        let purchase_id = AggregateId::new();

        f.purchases
            .execute(purchase_id, |p| {
                p.complete(
                    purchase_id,
                    f.owner,
                    vec![game("Hades", 4000)],
                    Money::from_cents(4000),
                )
            })
            .await
            .unwrap();
        f.purchases
            .execute(purchase_id, |p| p.refund())
            .await
            .unwrap();

        let purchase = f.purchases.load(purchase_id).await.unwrap();
        assert!(purchase.is_refunded());

        let second = f.purchases.execute(purchase_id, |p| p.refund()).await;
        assert!(matches!(
            second,
            Err(DomainError::Commerce(CommerceError::AlreadyRefunded { .. }))
        ));
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn stale_wallet_read_fails_the_whole_commit() {
        let f = open_accounts().await;
        f.wallets
            .execute(f.wallet_id, |w| w.deposit(Money::from_cents(10000)))
            .await
            .unwrap();

        // Two writers read the same wallet version.
        let wallet = f.wallets.load(f.wallet_id).await.unwrap();
        let cart = f.carts.load(f.cart_id).await.unwrap();

        f.wallets
            .execute(f.wallet_id, |w| w.deposit(Money::from_cents(1)))
            .await
            .unwrap();

        let purchase_id = AggregateId::new();
        let mut uow = UnitOfWork::new();
        uow.stage(
            f.wallet_id,
            &wallet,
            &wallet.debit(purchase_id, Money::from_cents(5000)).unwrap(),
        )
        .unwrap();
        uow.stage(f.cart_id, &cart, &cart.clear(purchase_id).unwrap())
            .unwrap();

        let err = uow.commit(&f.store).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. })
        ));

        let wallet = f.wallets.load(f.wallet_id).await.unwrap();
        assert_eq!(wallet.balance(), Money::from_cents(10001));
        assert_eq!(
            f.store.get_aggregate_version(f.cart_id).await.unwrap(),
            Some(Version::first())
        );
    }

    #[tokio::test]
    async fn injected_store_failure_writes_nothing() {
        let f = open_accounts().await;
        let before = f.store.event_count().await;
        f.store.set_fail_on_append(true);

        let result = f
            .wallets
            .execute(f.wallet_id, |w| w.deposit(Money::from_cents(500)))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::EventStore(EventStoreError::Unavailable(_)))
        ));
        assert_eq!(f.store.event_count().await, before);
    }
}
