//! Checkout, refunds and purchase history.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{AggregateId, UserId};
use domain::{Aggregate, PurchaseRecord};
use event_store::EventStore;
use projections::PurchaseSummary;
use serde::Serialize;

use super::{ItemResponse, parse_id};
use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub id: String,
    pub items: Vec<ItemResponse>,
    pub amount_cents: i64,
    pub purchased_at: Option<String>,
    pub refunded: bool,
    pub refunded_at: Option<String>,
}

impl From<&PurchaseRecord> for PurchaseResponse {
    fn from(purchase: &PurchaseRecord) -> Self {
        Self {
            id: purchase.id().map(|id| id.to_string()).unwrap_or_default(),
            items: purchase.items().iter().map(ItemResponse::from).collect(),
            amount_cents: purchase.amount().cents(),
            purchased_at: purchase.purchased_at().map(|at| at.to_rfc3339()),
            refunded: purchase.is_refunded(),
            refunded_at: purchase.refunded_at().map(|at| at.to_rfc3339()),
        }
    }
}

impl From<&PurchaseSummary> for PurchaseResponse {
    fn from(summary: &PurchaseSummary) -> Self {
        Self {
            id: summary.purchase_id.to_string(),
            items: summary.items.iter().map(ItemResponse::from).collect(),
            amount_cents: summary.amount.cents(),
            purchased_at: Some(summary.purchased_at.to_rfc3339()),
            refunded: summary.refunded,
            refunded_at: summary.refunded_at.map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct PurchaseHistoryResponse {
    pub user_id: String,
    pub purchases: Vec<PurchaseResponse>,
    pub net_spend_cents: i64,
}

/// POST /users/:id/checkout: buy everything in the cart.
#[tracing::instrument(skip(state))]
pub async fn checkout<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let purchase = state.store.checkout().checkout(user_id).await?;
    Ok((StatusCode::CREATED, Json(PurchaseResponse::from(&purchase))))
}

/// GET /users/:id/purchases: purchase history from the projection.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseHistoryResponse>, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    state.store.accounts().find(user_id).await?;

    // Run catch-up to ensure the read model includes latest events
    state.projection_processor.run_catch_up().await?;

    let purchases = state.purchase_history.purchases_for_user(user_id).await;
    let net_spend = state.purchase_history.net_spend(user_id).await;

    Ok(Json(PurchaseHistoryResponse {
        user_id: id,
        purchases: purchases.iter().map(PurchaseResponse::from).collect(),
        net_spend_cents: net_spend.cents(),
    }))
}

/// GET /purchases/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let purchase_id: AggregateId = parse_id(&id, "purchase")?;
    let purchase = state.store.refunds().get_purchase(purchase_id).await?;
    Ok(Json(PurchaseResponse::from(&purchase)))
}

/// POST /purchases/:id/refund
#[tracing::instrument(skip(state))]
pub async fn refund<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let purchase_id: AggregateId = parse_id(&id, "purchase")?;
    let purchase = state.store.refunds().refund(purchase_id).await?;
    Ok(Json(PurchaseResponse::from(&purchase)))
}
