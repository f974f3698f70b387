//! Lifecycle services for the order and inventory system.
//!
//! Two services sit between the HTTP surface and the stores:
//! - [`InventoryService`] — catalog management, stock updates, low-stock
//!   alerts, cached product listings
//! - [`OrderService`] — order placement with stock reservation, status
//!   transitions, fulfillment progress, cached order listings, and change
//!   event publication
//!
//! Both are generic over their collaborators, so tests wire in-memory
//! implementations and deterministic time and id sources.

mod cached;
mod error;
mod inventory;
mod orders;

pub use error::{DomainError, Result};
pub use inventory::InventoryService;
pub use orders::{NewOrder, NewOrderItem, OrderService};
