pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use cache::Cache;
use domain::{InventoryService, OrderService};
use events::EventPublisher;
use store::{InventoryStore, OrderStore};

/// Shared application state accessible from all handlers.
pub struct AppState<O, I, C, P>
where
    O: OrderStore,
    I: InventoryStore,
    C: Cache,
    P: EventPublisher,
{
    pub orders: OrderService<O, I, C, P>,
    pub inventory: InventoryService<I, C>,
}
