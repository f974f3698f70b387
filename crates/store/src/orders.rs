//! Order store: authoritative order records and the operational queue
//! buckets used by warehouse dashboards.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{Clock, IdGenerator, OrderId, RandomIds, SystemClock};
use tokio::sync::RwLock;

use crate::{Order, OrderDraft, OrderPatch, OrderStatus, Result, StoreError};

/// Core trait for order store implementations.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order, assigning identity, the order number, default
    /// statuses, and timestamps.
    async fn create(&self, draft: OrderDraft) -> Result<Order>;

    /// Retrieves an order by ID. Returns None if it doesn't exist.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders newest-first, optionally restricted to one status.
    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>>;

    /// Merges the provided fields into the order and bumps `updated_at`.
    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order>;

    /// Moves the order between queue buckets. `None` removes it from every
    /// bucket, which is how terminal orders leave the operational view.
    async fn move_to_queue(&self, id: OrderId, bucket: Option<OrderStatus>) -> Result<()>;

    /// Returns the ids currently queued under `bucket`, in insertion order.
    async fn queued(&self, bucket: OrderStatus) -> Result<Vec<OrderId>>;
}

struct OrderState {
    orders: HashMap<OrderId, Order>,
    queues: HashMap<OrderStatus, Vec<OrderId>>,
}

impl OrderState {
    fn remove_from_all_queues(&mut self, id: OrderId) {
        for queue in self.queues.values_mut() {
            queue.retain(|queued| *queued != id);
        }
    }
}

/// In-memory order store.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<OrderState>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl InMemoryOrderStore {
    /// Creates an empty store with the system clock and random ids.
    pub fn new() -> Self {
        Self::with_sources(Arc::new(SystemClock), Arc::new(RandomIds))
    }

    /// Creates an empty store with injected time and id sources.
    pub fn with_sources(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: Arc::new(RwLock::new(OrderState {
                orders: HashMap::new(),
                queues: HashMap::new(),
            })),
            clock,
            ids,
        }
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    fn next_order_number(&self, now: chrono::DateTime<chrono::Utc>) -> String {
        format!("ORD-{}-{}", now.timestamp_millis(), self.ids.token(9))
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, draft: OrderDraft) -> Result<Order> {
        let now = self.clock.now();
        let order = Order {
            id: self.ids.order_id(),
            number: self.next_order_number(now),
            customer: draft.customer,
            shipping_address: draft.shipping_address,
            items: draft.items,
            subtotal: draft.subtotal,
            tax: draft.tax,
            shipping: draft.shipping,
            total: draft.total,
            status: OrderStatus::Pending,
            payment_status: draft.payment_status,
            fulfillment_status: crate::FulfillmentStatus::Pending,
            tracking_number: None,
            notes: draft.notes,
            assigned_to: None,
            picking_started: None,
            packing_started: None,
            shipping_date: None,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| status.is_none_or(|s| order.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let order = state
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        patch.apply(order);
        order.updated_at = now;
        Ok(order.clone())
    }

    async fn move_to_queue(&self, id: OrderId, bucket: Option<OrderStatus>) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.orders.contains_key(&id) {
            return Err(StoreError::OrderNotFound(id));
        }

        state.remove_from_all_queues(id);
        if let Some(bucket) = bucket {
            state.queues.entry(bucket).or_default().push(id);
        }
        Ok(())
    }

    async fn queued(&self, bucket: OrderStatus) -> Result<Vec<OrderId>> {
        let state = self.state.read().await;
        Ok(state.queues.get(&bucket).cloned().unwrap_or_default())
    }
}
