//! Cart aggregate implementation.

use common::{AggregateId, GameId, UserId};
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::error::CommerceError;
use crate::library::Library;
use crate::value_objects::{CatalogItemRef, Money, checked_total_of, total_of};

use super::CartEvent;

/// A user's shopping cart.
///
/// Items keep their insertion order and appear at most once. The total is
/// recomputed from the item prices after every change.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    id: Option<AggregateId>,
    version: Version,
    owner: Option<UserId>,
    items: Vec<CatalogItemRef>,
    total: Money,
}

impl Aggregate for Cart {
    type Event = CartEvent;
    type Error = CommerceError;

    fn aggregate_type() -> &'static str {
        "Cart"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            CartEvent::CartOpened(data) => {
                self.id = Some(data.cart_id);
                self.owner = Some(data.owner);
                self.items.clear();
            }
            CartEvent::ItemAdded(data) => self.items.push(data.item),
            CartEvent::ItemRemoved(data) => self.items.retain(|i| i.game_id != data.game_id),
            CartEvent::CartCleared(_) => self.items.clear(),
        }
        self.total = total_of(&self.items);
    }
}

// Query methods
impl Cart {
    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn items(&self) -> &[CatalogItemRef] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, game_id: GameId) -> bool {
        self.items.iter().any(|i| i.game_id == game_id)
    }
}

// Command methods (return events)
impl Cart {
    pub fn open(&self, cart_id: AggregateId, owner: UserId) -> Result<Vec<CartEvent>, CommerceError> {
        if self.id.is_some() {
            return Err(CommerceError::invalid_input("cart already opened"));
        }
        Ok(vec![CartEvent::opened(cart_id, owner)])
    }

    /// Adds a game unless it is already in the cart or already owned.
    pub fn add_item(
        &self,
        item: CatalogItemRef,
        library: &Library,
    ) -> Result<Vec<CartEvent>, CommerceError> {
        self.ensure_open()?;
        if self.contains(item.game_id) {
            return Err(CommerceError::DuplicateInCart { name: item.name });
        }
        if library.contains(item.game_id) {
            return Err(CommerceError::AlreadyOwned { name: item.name });
        }
        if checked_total_of(self.items.iter().chain([&item])).is_none() {
            return Err(CommerceError::AmountOverflow {
                current: self.total,
                amount: item.price,
            });
        }
        Ok(vec![CartEvent::item_added(item)])
    }

    pub fn remove_item(&self, game_id: GameId) -> Result<Vec<CartEvent>, CommerceError> {
        self.ensure_open()?;
        if !self.contains(game_id) {
            return Err(CommerceError::NotInCart { game_id });
        }
        Ok(vec![CartEvent::item_removed(game_id)])
    }

    /// Empties the cart as part of a checkout.
    pub fn clear(&self, purchase_id: AggregateId) -> Result<Vec<CartEvent>, CommerceError> {
        self.ensure_open()?;
        Ok(vec![CartEvent::cleared(purchase_id)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_cart() -> Cart {
        let mut cart = Cart::default();
        let events = cart.open(AggregateId::new(), UserId::new()).unwrap();
        cart.apply_events(events);
        cart
    }

    fn open_library() -> Library {
        let mut library = Library::default();
        let events = library.open(AggregateId::new(), UserId::new()).unwrap();
        library.apply_events(events);
        library
    }

    fn game(name: &str, cents: i64) -> CatalogItemRef {
        CatalogItemRef::new(GameId::new(), name, Money::from_cents(cents))
    }

    #[test]
    fn test_add_items_recomputes_total() {
        let mut cart = open_cart();
        let library = open_library();

        for item in [game("Hades", 4000), game("Celeste", 3000)] {
            let events = cart.add_item(item, &library).unwrap();
            cart.apply_events(events);
        }

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total(), Money::from_cents(7000));
        assert_eq!(cart.items()[0].name, "Hades");
    }

    #[test]
    fn test_duplicate_item_is_rejected() {
        let mut cart = open_cart();
        let library = open_library();
        let item = game("Hades", 4000);

        let events = cart.add_item(item.clone(), &library).unwrap();
        cart.apply_events(events);

        assert_eq!(
            cart.add_item(item, &library).unwrap_err(),
            CommerceError::DuplicateInCart {
                name: "Hades".to_string()
            }
        );
    }

    #[test]
    fn test_item_overflowing_total_is_rejected() {
        let mut cart = open_cart();
        let library = open_library();
        let events = cart.add_item(game("Whale Edition", i64::MAX), &library).unwrap();
        cart.apply_events(events);

        let err = cart.add_item(game("Celeste", 1), &library).unwrap_err();

        assert_eq!(
            err,
            CommerceError::AmountOverflow {
                current: Money::from_cents(i64::MAX),
                amount: Money::from_cents(1),
            }
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_replay_of_overflowing_items_does_not_panic() {
        let mut cart = open_cart();
        cart.apply_events([
            CartEvent::item_added(game("Whale Edition", i64::MAX)),
            CartEvent::item_added(game("Celeste", 1)),
        ]);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total(), Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_owned_item_is_rejected() {
        let cart = open_cart();
        let mut library = open_library();
        let item = game("Hades", 4000);
        let events = library
            .grant(AggregateId::new(), vec![item.clone()])
            .unwrap();
        library.apply_events(events);

        assert_eq!(
            cart.add_item(item, &library).unwrap_err(),
            CommerceError::AlreadyOwned {
                name: "Hades".to_string()
            }
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let mut cart = open_cart();
        let library = open_library();
        let hades = game("Hades", 4000);
        let celeste = game("Celeste", 3000);

        for item in [hades.clone(), celeste] {
            let events = cart.add_item(item, &library).unwrap();
            cart.apply_events(events);
        }
        let events = cart.remove_item(hades.game_id).unwrap();
        cart.apply_events(events);

        assert!(!cart.contains(hades.game_id));
        assert_eq!(cart.total(), Money::from_cents(3000));
    }

    #[test]
    fn test_remove_missing_item_fails() {
        let cart = open_cart();
        let game_id = GameId::new();
        assert_eq!(
            cart.remove_item(game_id).unwrap_err(),
            CommerceError::NotInCart { game_id }
        );
    }

    #[test]
    fn test_clear_resets_total() {
        let mut cart = open_cart();
        let library = open_library();
        let events = cart.add_item(game("Hades", 4000), &library).unwrap();
        cart.apply_events(events);

        let events = cart.clear(AggregateId::new()).unwrap();
        cart.apply_events(events);

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_unopened_cart_is_not_found() {
        let cart = Cart::default();
        assert!(matches!(
            cart.remove_item(GameId::new()),
            Err(CommerceError::NotFound { entity: "Cart", .. })
        ));
    }
}
