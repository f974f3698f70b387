//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use cache::Cache;
use common::OrderId;
use domain::NewOrder;
use events::EventPublisher;
use serde::Deserialize;
use store::{FulfillmentStatus, InventoryStore, Order, OrderStatus, OrderStore};

use super::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateFulfillmentRequest {
    pub status: FulfillmentStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// POST /orders — place an order.
#[tracing::instrument(skip(state, input))]
pub async fn create<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Json(input): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let order = state.orders.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders?status= — list orders newest-first.
#[tracing::instrument(skip(state, query))]
pub async fn list<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let orders = state.orders.list_orders(query.status).await?;
    Ok(Json(orders))
}

/// GET /orders/recent — the newest orders, capped at fifty.
#[tracing::instrument(skip(state))]
pub async fn recent<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let orders = state.orders.recent_orders().await?;
    Ok(Json(orders))
}

/// GET /orders/{id} — fetch one order.
#[tracing::instrument(skip(state))]
pub async fn get<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let order = state.orders.get_order(id).await?;
    Ok(Json(order))
}

/// POST /orders/{id}/status — move an order to a new status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let order = state.orders.update_status(id, req.status, req.notes).await?;
    Ok(Json(order))
}

/// POST /orders/{id}/fulfillment — advance warehouse fulfillment.
#[tracing::instrument(skip(state, req))]
pub async fn update_fulfillment<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateFulfillmentRequest>,
) -> Result<Json<Order>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let order = state
        .orders
        .update_fulfillment(id, req.status, req.assigned_to)
        .await?;
    Ok(Json(order))
}
