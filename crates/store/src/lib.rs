//! Authoritative product and order records for the order and inventory
//! service.
//!
//! This crate owns the data model and the two store seams:
//! - [`InventoryStore`] — product records, stock arithmetic, and the
//!   low-stock alert log
//! - [`OrderStore`] — order records, listing, and the operational queue
//!   buckets
//!
//! Both traits ship with in-memory implementations backed by
//! `tokio::sync::RwLock`. Stock mutations happen under a single write lock,
//! so a conditional decrement is atomic: two concurrent order creations
//! against the same product cannot both observe the pre-decrement value.

mod error;
mod inventory;
mod order;
mod orders;
mod product;

pub use error::{Result, StoreError};
pub use inventory::{InMemoryInventoryStore, InventoryStore};
pub use order::{
    Address, Customer, FulfillmentStatus, Order, OrderDraft, OrderItem, OrderPatch, OrderStatus,
    PaymentStatus,
};
pub use orders::{InMemoryOrderStore, OrderStore};
pub use product::{
    Dimensions, LowStockAlert, NewProduct, Product, ProductFilter, ProductPatch, ProductStatus,
};
