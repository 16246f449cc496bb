//! Purchase record aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, GameId, UserId};
use event_store::Version;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::error::CommerceError;
use crate::value_objects::{CatalogItemRef, Money};

use super::PurchaseEvent;

/// Immutable receipt of a checkout. Only the refund flag ever changes,
/// from false to true, once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurchaseRecord {
    id: Option<AggregateId>,
    #[serde(skip)]
    version: Version,
    owner: Option<UserId>,
    items: Vec<CatalogItemRef>,
    amount: Money,
    purchased_at: Option<DateTime<Utc>>,
    refunded: bool,
    refunded_at: Option<DateTime<Utc>>,
}

impl Aggregate for PurchaseRecord {
    type Event = PurchaseEvent;
    type Error = CommerceError;

    fn aggregate_type() -> &'static str {
        "PurchaseRecord"
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
            PurchaseEvent::PurchaseCompleted(data) => {
                self.id = Some(data.purchase_id);
                self.owner = Some(data.owner);
                self.items = data.items;
                self.amount = data.amount;
                self.purchased_at = Some(data.purchased_at);
            }
            PurchaseEvent::PurchaseRefunded(data) => {
                self.refunded = true;
                self.refunded_at = Some(data.refunded_at);
            }
        }
    }
}

// Query methods
impl PurchaseRecord {
    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn items(&self) -> &[CatalogItemRef] {
        &self.items
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        self.items.iter().map(|item| item.game_id).collect()
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn purchased_at(&self) -> Option<DateTime<Utc>> {
        self.purchased_at
    }

    pub fn is_refunded(&self) -> bool {
        self.refunded
    }

    pub fn refunded_at(&self) -> Option<DateTime<Utc>> {
        self.refunded_at
    }
}

// Command methods (return events)
impl PurchaseRecord {
    /// Records a completed checkout.
    pub fn complete(
        &self,
        purchase_id: AggregateId,
        owner: UserId,
        items: Vec<CatalogItemRef>,
        amount: Money,
    ) -> Result<Vec<PurchaseEvent>, CommerceError> {
        if self.id.is_some() {
            return Err(CommerceError::invalid_input("purchase already recorded"));
        }
        if items.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        Ok(vec![PurchaseEvent::completed(
            purchase_id,
            owner,
            items,
            amount,
        )])
    }

    /// Marks the purchase refunded.
    pub fn refund(&self) -> Result<Vec<PurchaseEvent>, CommerceError> {
        let (Some(id), Some(owner)) = (self.id, self.owner) else {
            return Err(CommerceError::not_found("Purchase", "unrecorded"));
        };
        if self.refunded {
            return Err(CommerceError::AlreadyRefunded { purchase_id: id });
        }
        Ok(vec![PurchaseEvent::refunded(id, owner, self.amount)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_purchase() -> (PurchaseRecord, AggregateId) {
        let mut purchase = PurchaseRecord::default();
        let purchase_id = AggregateId::new();
        let items = vec![
            CatalogItemRef::new(GameId::new(), "Hades", Money::from_cents(4000)),
            CatalogItemRef::new(GameId::new(), "Celeste", Money::from_cents(3000)),
        ];
        let events = purchase
            .complete(purchase_id, UserId::new(), items, Money::from_cents(7000))
            .unwrap();
        purchase.apply_events(events);
        (purchase, purchase_id)
    }

    #[test]
    fn test_complete_records_snapshot() {
        let (purchase, purchase_id) = completed_purchase();
        assert_eq!(purchase.id(), Some(purchase_id));
        assert_eq!(purchase.items().len(), 2);
        assert_eq!(purchase.amount(), Money::from_cents(7000));
        assert!(purchase.purchased_at().is_some());
        assert!(!purchase.is_refunded());
    }

    #[test]
    fn test_complete_without_items_fails() {
        let purchase = PurchaseRecord::default();
        assert_eq!(
            purchase
                .complete(AggregateId::new(), UserId::new(), vec![], Money::zero())
                .unwrap_err(),
            CommerceError::EmptyCart
        );
    }

    #[test]
    fn test_refund_flips_flag_once() {
        let (mut purchase, purchase_id) = completed_purchase();
        let events = purchase.refund().unwrap();
        purchase.apply_events(events);

        assert!(purchase.is_refunded());
        assert!(purchase.refunded_at().is_some());
        assert_eq!(
            purchase.refund().unwrap_err(),
            CommerceError::AlreadyRefunded { purchase_id }
        );
    }

    #[test]
    fn test_refund_of_missing_purchase_is_not_found() {
        assert!(matches!(
            PurchaseRecord::default().refund(),
            Err(CommerceError::NotFound { .. })
        ));
    }
}
