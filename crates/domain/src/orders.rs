//! Order lifecycle: creation with stock reservation, status transitions,
//! and fulfillment progress.

use std::sync::Arc;

use cache::{Cache, keys};
use common::{Clock, IdGenerator, Money, OrderId, ProductId};
use events::{ChangeEvent, ChangeKind, EventPublisher};
use serde::{Deserialize, Serialize};
use store::{
    Address, Customer, FulfillmentStatus, InventoryStore, Order, OrderDraft, OrderItem,
    OrderPatch, OrderStatus, OrderStore, PaymentStatus, StoreError,
};

use crate::cached;
use crate::error::{DomainError, Result};

/// Input for placing an order. Line items reference products by id; names,
/// SKUs, and prices are denormalized from the catalog at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: Customer,
    pub shipping_address: Address,
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub shipping: Money,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One requested line: which product and how many units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Maps a customer-facing status to its operational queue bucket.
///
/// Only pending, processing, and shipped orders appear on warehouse
/// dashboards; confirmed orders wait in the pending bucket and terminal
/// orders leave the queues entirely.
fn queue_bucket(status: OrderStatus) -> Option<OrderStatus> {
    match status {
        OrderStatus::Pending | OrderStatus::Confirmed => Some(OrderStatus::Pending),
        OrderStatus::Processing => Some(OrderStatus::Processing),
        OrderStatus::Shipped => Some(OrderStatus::Shipped),
        OrderStatus::Delivered | OrderStatus::Cancelled => None,
    }
}

/// Order lifecycle coordinator.
///
/// Order creation is a dual write across the inventory and order stores.
/// Stock is decremented first and the order written last; if anything fails
/// after a decrement, the decrements taken so far are restored, so a failed
/// creation never leaks reserved stock.
pub struct OrderService<O, I, C, P>
where
    O: OrderStore,
    I: InventoryStore,
    C: Cache,
    P: EventPublisher,
{
    orders: Arc<O>,
    inventory: Arc<I>,
    cache: Arc<C>,
    publisher: Arc<P>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<O, I, C, P> OrderService<O, I, C, P>
where
    O: OrderStore,
    I: InventoryStore,
    C: Cache,
    P: EventPublisher,
{
    pub fn new(
        orders: Arc<O>,
        inventory: Arc<I>,
        cache: Arc<C>,
        publisher: Arc<P>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            orders,
            inventory,
            cache,
            publisher,
            clock,
            ids,
        }
    }

    /// Places an order: validates the request, reserves stock, persists the
    /// order, queues it as pending, and announces it.
    #[tracing::instrument(skip(self, input), fields(items = input.items.len()))]
    pub async fn create_order(&self, input: NewOrder) -> Result<Order> {
        self.validate_new_order(&input)?;

        // Reserve stock item by item, remembering what was taken so a
        // failure part-way can be compensated.
        let mut taken: Vec<(ProductId, u32)> = Vec::with_capacity(input.items.len());
        let mut items: Vec<OrderItem> = Vec::with_capacity(input.items.len());
        for line in &input.items {
            match self
                .inventory
                .decrement_stock(line.product_id, line.quantity)
                .await
            {
                Ok(product) => {
                    taken.push((line.product_id, line.quantity));
                    items.push(OrderItem::new(
                        product.id,
                        product.name,
                        product.sku,
                        line.quantity,
                        product.price,
                    ));
                }
                Err(e) => {
                    self.restore_decrements(&taken).await;
                    return Err(e.into());
                }
            }
        }

        let subtotal: Money = items.iter().map(|item| item.total).sum();
        let total = subtotal + input.tax + input.shipping;
        let draft = OrderDraft {
            customer: input.customer,
            shipping_address: input.shipping_address,
            items,
            subtotal,
            tax: input.tax,
            shipping: input.shipping,
            total,
            payment_status: input.payment_status,
            notes: input.notes,
        };

        let order = match self.orders.create(draft).await {
            Ok(order) => order,
            Err(e) => {
                self.restore_decrements(&taken).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self
            .orders
            .move_to_queue(order.id, queue_bucket(order.status))
            .await
        {
            tracing::warn!(order_id = %order.id, error = %e, "failed to queue new order");
        }

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_total_cents").record(order.total.cents() as f64);
        tracing::info!(order_id = %order.id, number = %order.number, total = %order.total, "order created");

        self.invalidate_order_lists().await;
        self.announce(ChangeKind::OrderCreated, order.clone()).await;
        Ok(order)
    }

    /// Retrieves an order, failing if it does not exist.
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or(DomainError::Store(StoreError::OrderNotFound(id)))
    }

    /// Lists orders newest-first. The unfiltered listing is served through
    /// the cache; status-filtered listings always hit the store.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        if status.is_none() {
            if let Some(orders) = cached::fetch(self.cache.as_ref(), keys::ALL_ORDERS).await {
                return Ok(orders);
            }
        }

        let orders = self.orders.list(status).await?;
        if status.is_none() {
            cached::put(
                self.cache.as_ref(),
                keys::ALL_ORDERS,
                keys::ALL_ORDERS_TTL,
                &orders,
            )
            .await;
        }
        Ok(orders)
    }

    /// Returns the newest orders, capped at the recent-orders limit.
    #[tracing::instrument(skip(self))]
    pub async fn recent_orders(&self) -> Result<Vec<Order>> {
        if let Some(orders) = cached::fetch(self.cache.as_ref(), keys::RECENT_ORDERS).await {
            return Ok(orders);
        }

        let mut orders = self.orders.list(None).await?;
        orders.truncate(keys::RECENT_ORDERS_LIMIT);
        cached::put(
            self.cache.as_ref(),
            keys::RECENT_ORDERS,
            keys::RECENT_ORDERS_TTL,
            &orders,
        )
        .await;
        Ok(orders)
    }

    /// Moves an order to a new customer-facing status.
    ///
    /// The first transition to shipped assigns a tracking number and stamps
    /// the shipping date; repeating the shipped transition changes neither.
    #[tracing::instrument(skip(self, notes), fields(to = %next))]
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        notes: Option<String>,
    ) -> Result<Order> {
        let order = self.get_order(id).await?;

        if !order.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let mut patch = OrderPatch {
            status: Some(next),
            notes,
            ..OrderPatch::default()
        };
        if next == OrderStatus::Shipped && order.tracking_number.is_none() {
            patch.tracking_number = Some(self.tracking_number());
            if order.shipping_date.is_none() {
                patch.shipping_date = Some(self.clock.now());
            }
        }

        let updated = self.orders.update(id, patch).await?;
        self.orders.move_to_queue(id, queue_bucket(next)).await?;

        metrics::counter!("order_status_transitions_total", "to" => next.as_str()).increment(1);
        tracing::info!(order_id = %id, from = %order.status, to = %next, "order status updated");

        self.invalidate_order_lists().await;
        self.announce(ChangeKind::StatusUpdated, updated.clone()).await;
        Ok(updated)
    }

    /// Advances the warehouse fulfillment state of an order.
    ///
    /// Milestone timestamps are stamped the first time their state is
    /// entered and never rewritten, so replays and corrections keep the
    /// original times.
    #[tracing::instrument(skip(self, assigned_to), fields(to = %next))]
    pub async fn update_fulfillment(
        &self,
        id: OrderId,
        next: FulfillmentStatus,
        assigned_to: Option<String>,
    ) -> Result<Order> {
        let order = self.get_order(id).await?;
        let now = self.clock.now();

        let mut patch = OrderPatch {
            fulfillment_status: Some(next),
            assigned_to,
            ..OrderPatch::default()
        };
        match next {
            FulfillmentStatus::Picking if order.picking_started.is_none() => {
                patch.picking_started = Some(now);
            }
            FulfillmentStatus::Packing if order.packing_started.is_none() => {
                patch.packing_started = Some(now);
            }
            FulfillmentStatus::Shipped if order.shipping_date.is_none() => {
                patch.shipping_date = Some(now);
            }
            _ => {}
        }

        let updated = self.orders.update(id, patch).await?;

        tracing::info!(order_id = %id, to = %next, "fulfillment updated");

        self.invalidate_order_lists().await;
        self.announce(ChangeKind::FulfillmentUpdated, updated.clone())
            .await;
        Ok(updated)
    }

    fn validate_new_order(&self, input: &NewOrder) -> Result<()> {
        if input.items.is_empty() {
            return Err(DomainError::Validation(
                "Order must contain at least one item".into(),
            ));
        }
        if input.items.iter().any(|item| item.quantity == 0) {
            return Err(DomainError::Validation(
                "Item quantities must be greater than zero".into(),
            ));
        }
        if input.customer.name.trim().is_empty() || input.customer.email.trim().is_empty() {
            return Err(DomainError::Validation(
                "Customer name and email are required".into(),
            ));
        }
        let address = &input.shipping_address;
        if [
            &address.street,
            &address.city,
            &address.state,
            &address.zip,
            &address.country,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
        {
            return Err(DomainError::Validation(
                "Shipping address must be complete".into(),
            ));
        }
        if input.tax.is_negative() || input.shipping.is_negative() {
            return Err(DomainError::Validation(
                "Tax and shipping must not be negative".into(),
            ));
        }
        Ok(())
    }

    fn tracking_number(&self) -> String {
        format!(
            "TRK{}{}",
            self.clock.now().timestamp_millis(),
            self.ids.token(6)
        )
    }

    async fn restore_decrements(&self, taken: &[(ProductId, u32)]) {
        for (product_id, quantity) in taken {
            if let Err(e) = self.inventory.restore_stock(*product_id, *quantity).await {
                tracing::error!(
                    product_id = %product_id,
                    quantity,
                    error = %e,
                    "failed to restore stock for aborted order"
                );
            }
        }
    }

    /// Drops the stale order listings and eagerly rebuilds the
    /// recent-orders view, which dashboards poll on every page load.
    async fn invalidate_order_lists(&self) {
        cached::invalidate(self.cache.as_ref(), &[keys::ALL_ORDERS, keys::RECENT_ORDERS]).await;

        match self.orders.list(None).await {
            Ok(mut orders) => {
                orders.truncate(keys::RECENT_ORDERS_LIMIT);
                cached::put(
                    self.cache.as_ref(),
                    keys::RECENT_ORDERS,
                    keys::RECENT_ORDERS_TTL,
                    &orders,
                )
                .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to rebuild recent orders cache");
            }
        }
    }

    async fn announce(&self, kind: ChangeKind, order: Order) {
        if let Err(e) = self.publisher.publish(ChangeEvent::new(kind, order)).await {
            tracing::warn!(error = %e, "failed to publish order change event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_bucket_mapping() {
        assert_eq!(
            queue_bucket(OrderStatus::Pending),
            Some(OrderStatus::Pending)
        );
        assert_eq!(
            queue_bucket(OrderStatus::Confirmed),
            Some(OrderStatus::Pending)
        );
        assert_eq!(
            queue_bucket(OrderStatus::Processing),
            Some(OrderStatus::Processing)
        );
        assert_eq!(
            queue_bucket(OrderStatus::Shipped),
            Some(OrderStatus::Shipped)
        );
        assert_eq!(queue_bucket(OrderStatus::Delivered), None);
        assert_eq!(queue_bucket(OrderStatus::Cancelled), None);
    }
}
