//! Wallet balance and deposits.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use domain::Money;
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct DepositRequest {
    pub amount_cents: i64,
}

#[derive(Serialize)]
pub struct WalletResponse {
    pub user_id: String,
    pub balance_cents: i64,
}

/// GET /users/:id/wallet
#[tracing::instrument(skip(state))]
pub async fn balance<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<WalletResponse>, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let balance = state.store.ledger().balance(user_id).await?;
    Ok(Json(WalletResponse {
        user_id: id,
        balance_cents: balance.cents(),
    }))
}

/// POST /users/:id/wallet/deposit
#[tracing::instrument(skip(state, req))]
pub async fn deposit<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<DepositRequest>,
) -> Result<Json<WalletResponse>, ApiError> {
    let user_id: UserId = parse_id(&id, "user")?;
    let balance = state
        .store
        .ledger()
        .deposit(user_id, Money::from_cents(req.amount_cents))
        .await?;
    Ok(Json(WalletResponse {
        user_id: id,
        balance_cents: balance.cents(),
    }))
}
