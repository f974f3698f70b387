//! Well-known cache keys and their TTLs.

use std::time::Duration;

/// Full order listing.
pub const ALL_ORDERS: &str = "all_orders";
pub const ALL_ORDERS_TTL: Duration = Duration::from_secs(300);

/// Full product listing.
pub const ALL_PRODUCTS: &str = "all_products";
pub const ALL_PRODUCTS_TTL: Duration = Duration::from_secs(600);

/// The newest orders, capped at [`RECENT_ORDERS_LIMIT`].
pub const RECENT_ORDERS: &str = "recent_orders";
pub const RECENT_ORDERS_TTL: Duration = Duration::from_secs(300);
pub const RECENT_ORDERS_LIMIT: usize = 50;

/// Products with `active` status.
pub const ACTIVE_PRODUCTS: &str = "active_products";
pub const ACTIVE_PRODUCTS_TTL: Duration = Duration::from_secs(600);
