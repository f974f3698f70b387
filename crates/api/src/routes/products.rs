//! Product catalog and stock endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use cache::Cache;
use common::ProductId;
use events::EventPublisher;
use serde::{Deserialize, Serialize};
use store::{
    InventoryStore, LowStockAlert, NewProduct, OrderStore, Product, ProductFilter,
};

use super::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ListProductsQuery {
    pub filter: Option<ProductFilter>,
}

#[derive(Deserialize)]
pub struct StockUpdateRequest {
    pub updates: Vec<StockUpdate>,
}

#[derive(Deserialize)]
pub struct StockUpdate {
    pub product_id: ProductId,
    pub stock: u32,
}

#[derive(Serialize)]
pub struct StockUpdateResponse {
    /// Number of products actually updated; unknown ids are skipped.
    pub updated: usize,
    pub products: Vec<Product>,
}

/// GET /products?filter=active|low_stock — list products.
#[tracing::instrument(skip(state, query))]
pub async fn list<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let products = state.inventory.list_products(query.filter).await?;
    Ok(Json(products))
}

/// POST /products — add a product to the catalog.
#[tracing::instrument(skip(state, input))]
pub async fn create<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let product = state.inventory.add_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// POST /products/stock — apply a batch of stock updates.
#[tracing::instrument(skip(state, req))]
pub async fn bulk_update_stock<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
    Json(req): Json<StockUpdateRequest>,
) -> Result<Json<StockUpdateResponse>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let updates: Vec<(ProductId, u32)> = req
        .updates
        .iter()
        .map(|u| (u.product_id, u.stock))
        .collect();

    let products = state.inventory.bulk_update_stock(&updates).await?;
    Ok(Json(StockUpdateResponse {
        updated: products.len(),
        products,
    }))
}

/// GET /products/alerts — the low-stock alert log.
#[tracing::instrument(skip(state))]
pub async fn alerts<O, I, C, P>(
    State(state): State<Arc<AppState<O, I, C, P>>>,
) -> Result<Json<Vec<LowStockAlert>>, ApiError>
where
    O: OrderStore + 'static,
    I: InventoryStore + 'static,
    C: Cache + 'static,
    P: EventPublisher + 'static,
{
    let alerts = state.inventory.alerts().await?;
    Ok(Json(alerts))
}
