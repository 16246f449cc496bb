//! Purchase history read model: every checkout a user made, oldest first.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AggregateId, UserId};
use domain::{CatalogItemRef, Money, PurchaseEvent};
use event_store::EventEnvelope;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::ProjectionError;
use crate::projection::{Projection, ProjectionPosition, ReadModel};

/// One purchase as shown in a user's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseSummary {
    pub purchase_id: AggregateId,
    pub items: Vec<CatalogItemRef>,
    pub amount: Money,
    pub purchased_at: DateTime<Utc>,
    pub refunded: bool,
    pub refunded_at: Option<DateTime<Utc>>,
}

struct PurchaseHistoryState {
    by_user: HashMap<UserId, Vec<PurchaseSummary>>,
    purchase_owner: HashMap<AggregateId, UserId>,
    position: ProjectionPosition,
}

/// Read model view of purchases grouped by user.
#[derive(Clone)]
pub struct PurchaseHistoryView {
    state: Arc<RwLock<PurchaseHistoryState>>,
}

impl PurchaseHistoryView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(PurchaseHistoryState {
                by_user: HashMap::new(),
                purchase_owner: HashMap::new(),
                position: ProjectionPosition::START,
            })),
        }
    }

    /// Purchases made by `user_id`, ordered by purchase time.
    pub async fn purchases_for_user(&self, user_id: UserId) -> Vec<PurchaseSummary> {
        self.state
            .read()
            .await
            .by_user
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Total paid by `user_id` minus what was refunded.
    pub async fn net_spend(&self, user_id: UserId) -> Money {
        self.state
            .read()
            .await
            .by_user
            .get(&user_id)
            .map(|purchases| {
                purchases
                    .iter()
                    .filter(|p| !p.refunded)
                    .map(|p| p.amount)
                    .sum()
            })
            .unwrap_or_else(Money::zero)
    }
}

impl Default for PurchaseHistoryView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for PurchaseHistoryView {
    fn name(&self) -> &'static str {
        "PurchaseHistoryView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        if !event.is_from("PurchaseRecord") {
            let mut state = self.state.write().await;
            state.position = state.position.next();
            return Ok(());
        }

        let purchase_event: PurchaseEvent = event
            .decode()
            .map_err(|err| ProjectionError::payload(event, err))?;
        let mut state = self.state.write().await;

        match purchase_event {
            PurchaseEvent::PurchaseCompleted(data) => {
                if !state.purchase_owner.contains_key(&data.purchase_id) {
                    state.purchase_owner.insert(data.purchase_id, data.owner);
                    let purchases = state.by_user.entry(data.owner).or_default();
                    let at = purchases.partition_point(|p| p.purchased_at <= data.purchased_at);
                    purchases.insert(
                        at,
                        PurchaseSummary {
                            purchase_id: data.purchase_id,
                            items: data.items,
                            amount: data.amount,
                            purchased_at: data.purchased_at,
                            refunded: false,
                            refunded_at: None,
                        },
                    );
                }
            }
            PurchaseEvent::PurchaseRefunded(data) => {
                if let Some(summary) = state
                    .by_user
                    .get_mut(&data.owner)
                    .and_then(|purchases| {
                        purchases
                            .iter_mut()
                            .find(|p| p.purchase_id == data.purchase_id)
                    })
                {
                    summary.refunded = true;
                    summary.refunded_at = Some(data.refunded_at);
                }
            }
        }

        state.position = state.position.next();
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.by_user.clear();
        state.purchase_owner.clear();
        state.position = ProjectionPosition::START;
        Ok(())
    }
}

impl ReadModel for PurchaseHistoryView {
    fn name(&self) -> &'static str {
        "PurchaseHistoryView"
    }

    fn count(&self) -> usize {
        self.state
            .try_read()
            .map(|s| s.purchase_owner.len())
            .unwrap_or(0)
    }
}
