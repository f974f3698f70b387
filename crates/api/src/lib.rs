//! HTTP API server for the order and inventory service.
//!
//! Binds the lifecycle services to REST endpoints with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use cache::{Cache, InMemoryCache};
use common::{Clock, IdGenerator, RandomIds, SystemClock};
use domain::{InventoryService, OrderService};
use events::{BroadcastPublisher, EventPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryInventoryStore, InMemoryOrderStore, InventoryStore, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// State wired with the in-memory implementations.
pub type DefaultAppState =
    AppState<InMemoryOrderStore, InMemoryInventoryStore, InMemoryCache, BroadcastPublisher>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<O, I, C, P>(
    state: Arc<AppState<O, I, C, P>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list::<O, I, C, P>))
        .route("/products", post(routes::products::create::<O, I, C, P>))
        .route(
            "/products/stock",
            post(routes::products::bulk_update_stock::<O, I, C, P>),
        )
        .route("/products/alerts", get(routes::products::alerts::<O, I, C, P>))
        .route("/orders", get(routes::orders::list::<O, I, C, P>))
        .route("/orders", post(routes::orders::create::<O, I, C, P>))
        .route("/orders/recent", get(routes::orders::recent::<O, I, C, P>))
        .route("/orders/{id}", get(routes::orders::get::<O, I, C, P>))
        .route(
            "/orders/{id}/status",
            post(routes::orders::update_status::<O, I, C, P>),
        )
        .route(
            "/orders/{id}/fulfillment",
            post(routes::orders::update_fulfillment::<O, I, C, P>),
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

/// Creates application state on the in-memory stores, the system clock,
/// and random ids. Also returns the publisher so callers can subscribe to
/// order change events.
pub fn create_default_state() -> (Arc<DefaultAppState>, Arc<BroadcastPublisher>) {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids: Arc<dyn IdGenerator> = Arc::new(RandomIds);

    let inventory_store = Arc::new(InMemoryInventoryStore::with_sources(
        clock.clone(),
        ids.clone(),
    ));
    let order_store = Arc::new(InMemoryOrderStore::with_sources(clock.clone(), ids.clone()));
    let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
    let publisher = Arc::new(BroadcastPublisher::default());

    let state = Arc::new(AppState {
        orders: OrderService::new(
            order_store,
            inventory_store.clone(),
            cache.clone(),
            publisher.clone(),
            clock,
            ids,
        ),
        inventory: InventoryService::new(inventory_store, cache),
    });

    (state, publisher)
}
