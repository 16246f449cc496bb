//! HTTP API server for the game store.
//!
//! Provides REST endpoints for users, wallets, carts, checkout, refunds,
//! libraries and the catalog, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use commerce::Storefront;
use domain::{InMemoryCatalog, InMemoryUserDirectory};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projections::{Projection, ProjectionProcessor, PurchaseHistoryView};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The store services as wired for the HTTP server.
pub type GameStore<S> = Storefront<S, InMemoryCatalog, InMemoryUserDirectory>;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub store: GameStore<S>,
    pub catalog: Arc<InMemoryCatalog>,
    pub purchase_history: PurchaseHistoryView,
    pub projection_processor: Arc<ProjectionProcessor<S>>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health))
        .route("/users", post(routes::users::register::<S>))
        .route("/users/{id}", get(routes::users::get::<S>))
        .route("/users/{id}/wallet", get(routes::wallet::balance::<S>))
        .route(
            "/users/{id}/wallet/deposit",
            post(routes::wallet::deposit::<S>),
        )
        .route("/users/{id}/cart", get(routes::cart::get::<S>))
        .route("/users/{id}/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/users/{id}/cart/items/{game_id}",
            delete(routes::cart::remove_item::<S>),
        )
        .route("/users/{id}/checkout", post(routes::purchases::checkout::<S>))
        .route("/users/{id}/library", get(routes::library::get::<S>))
        .route(
            "/users/{id}/purchases",
            get(routes::purchases::list_for_user::<S>),
        )
        .route("/purchases/{id}", get(routes::purchases::get::<S>))
        .route("/purchases/{id}/refund", post(routes::purchases::refund::<S>))
        .route(
            "/games",
            get(routes::games::list::<S>).post(routes::games::create::<S>),
        )
        .route(
            "/games/{id}",
            get(routes::games::get::<S>)
                .put(routes::games::update::<S>)
                .delete(routes::games::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over `event_store`, with an in-memory
/// catalog and user directory and the purchase history projection
/// registered.
pub fn create_default_state<S: EventStore + Clone + 'static>(
    event_store: S,
) -> (Arc<AppState<S>>, Arc<ProjectionProcessor<S>>) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let store = Storefront::new(event_store.clone(), Arc::clone(&catalog), users);

    let purchase_history = PurchaseHistoryView::new();
    let mut processor = ProjectionProcessor::new(event_store);
    processor.register(Box::new(purchase_history.clone()) as Box<dyn Projection>);
    let processor = Arc::new(processor);

    let state = Arc::new(AppState {
        store,
        catalog,
        purchase_history,
        projection_processor: Arc::clone(&processor),
    });

    (state, processor)
}
