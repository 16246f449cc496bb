//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CommerceError, DomainError};
use event_store::EventStoreError;
use projections::ProjectionError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl From<CommerceError> for ApiError {
    fn from(err: CommerceError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::Commerce(err)) => commerce_status(err),
            ApiError::Domain(DomainError::EventStore(EventStoreError::ConcurrencyConflict {
                ..
            })) => StatusCode::CONFLICT,
            ApiError::Domain(_) | ApiError::Projection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Domain(DomainError::Commerce(err)) => err.kind(),
            ApiError::Domain(err) if err.is_conflict() => "conflict",
            ApiError::Domain(_) | ApiError::Projection(_) => "internal",
        }
    }
}

fn commerce_status(err: &CommerceError) -> StatusCode {
    match err {
        CommerceError::NotFound { .. } | CommerceError::NotInCart { .. } => StatusCode::NOT_FOUND,
        CommerceError::InvalidInput(_)
        | CommerceError::InvalidAmount { .. }
        | CommerceError::AmountOverflow { .. }
        | CommerceError::EmptyCart => StatusCode::BAD_REQUEST,
        CommerceError::DuplicateInCart { .. }
        | CommerceError::AlreadyOwned { .. }
        | CommerceError::AlreadyRefunded { .. }
        | CommerceError::GameAlreadyExists { .. } => StatusCode::CONFLICT,
        CommerceError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "internal server error");
        }

        let mut body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let ApiError::Domain(DomainError::Commerce(CommerceError::InsufficientFunds {
            balance,
            required,
        })) = &self
        {
            body["balance_cents"] = balance.cents().into();
            body["required_cents"] = required.cents().into();
        }

        (status, axum::Json(body)).into_response()
    }
}
