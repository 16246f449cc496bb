//! Purchase record events.

use chrono::{DateTime, Utc};
use common::{AggregateId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{CatalogItemRef, Money};

/// Events that can occur on a purchase record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PurchaseEvent {
    PurchaseCompleted(PurchaseCompletedData),
    PurchaseRefunded(PurchaseRefundedData),
}

impl DomainEvent for PurchaseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PurchaseEvent::PurchaseCompleted(_) => "PurchaseCompleted",
            PurchaseEvent::PurchaseRefunded(_) => "PurchaseRefunded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCompletedData {
    pub purchase_id: AggregateId,
    pub owner: UserId,

    /// Snapshot of the cart at checkout.
    pub items: Vec<CatalogItemRef>,
    pub amount: Money,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRefundedData {
    pub purchase_id: AggregateId,
    pub owner: UserId,
    pub amount: Money,
    pub refunded_at: DateTime<Utc>,
}

impl PurchaseEvent {
    pub fn completed(
        purchase_id: AggregateId,
        owner: UserId,
        items: Vec<CatalogItemRef>,
        amount: Money,
    ) -> Self {
        PurchaseEvent::PurchaseCompleted(PurchaseCompletedData {
            purchase_id,
            owner,
            items,
            amount,
            purchased_at: Utc::now(),
        })
    }

    pub fn refunded(purchase_id: AggregateId, owner: UserId, amount: Money) -> Self {
        PurchaseEvent::PurchaseRefunded(PurchaseRefundedData {
            purchase_id,
            owner,
            amount,
            refunded_at: Utc::now(),
        })
    }
}
