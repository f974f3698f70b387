use common::{OrderId, ProductId, Sku};
use thiserror::Error;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A product with the same SKU already exists.
    #[error("Duplicate SKU: {0}")]
    DuplicateSku(Sku),

    /// A stock decrement would drop the level below zero.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The backing store is unreachable.
    ///
    /// Never produced by the in-memory implementations; kept on the seam so
    /// remote-backed implementations surface outages as a request-scoped
    /// failure rather than a panic.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
