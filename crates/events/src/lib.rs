//! Change notifications for order lifecycle updates.
//!
//! Every successful order mutation publishes a [`ChangeEvent`] on the
//! `order_updates` topic so dashboards and other listeners can refresh
//! without polling. Publishing is fire-and-forget: a publish failure is
//! logged by the caller and never fails the mutation that produced it.

use common::OrderId;
use serde::{Deserialize, Serialize};
use store::Order;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Topic on which order change events are published.
pub const ORDER_UPDATES_TOPIC: &str = "order_updates";

/// What kind of change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    OrderCreated,
    StatusUpdated,
    FulfillmentUpdated,
}

/// A change notification carrying the full post-change order record, so
/// listeners never need a follow-up read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub order_id: OrderId,
    pub order: Order,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, order: Order) -> Self {
        Self {
            kind,
            order_id: order.id,
            order,
        }
    }
}

/// Errors that can occur when publishing an event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event channel is unreachable.
    ///
    /// Never produced by [`BroadcastPublisher`]; kept on the seam so
    /// broker-backed implementations surface outages to the caller, who
    /// logs and moves on.
    #[error("Event channel unavailable: {0}")]
    Unavailable(String),
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;

/// Core trait for event publisher implementations.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one change event. Having no subscribers is a success.
    async fn publish(&self, event: ChangeEvent) -> Result<()>;
}

/// Publisher backed by a `tokio::sync::broadcast` channel.
///
/// Subscribers that fall behind lose the oldest events; the channel never
/// backpressures publishers.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastPublisher {
    /// Creates a publisher buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a new subscription receiving events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, event: ChangeEvent) -> Result<()> {
        metrics::counter!("order_events_published_total", "kind" => match event.kind {
            ChangeKind::OrderCreated => "order_created",
            ChangeKind::StatusUpdated => "status_updated",
            ChangeKind::FulfillmentUpdated => "fulfillment_updated",
        })
        .increment(1);

        // send() errs only when there are no receivers, which is not a
        // failure for fire-and-forget notifications.
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(topic = ORDER_UPDATES_TOPIC, delivered, "published order change event");
        Ok(())
    }
}

/// Publisher that drops every event. For tests and disabled wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: ChangeEvent) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId, Sku};
    use store::{Address, Customer, FulfillmentStatus, OrderItem, OrderStatus, PaymentStatus};

    fn sample_order() -> Order {
        let item = OrderItem::new(
            ProductId::new(),
            "Rice 5kg",
            Sku::new("RICE-5KG"),
            2,
            Money::from_cents(450),
        );
        Order {
            id: OrderId::new(),
            number: "ORD-0-000000000".to_string(),
            customer: Customer {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: String::new(),
            },
            shipping_address: Address {
                street: "1 Main St".to_string(),
                city: "Lagos".to_string(),
                state: "LA".to_string(),
                zip: "100001".to_string(),
                country: "NG".to_string(),
            },
            subtotal: item.total,
            tax: Money::zero(),
            shipping: Money::zero(),
            total: item.total,
            items: vec![item],
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            fulfillment_status: FulfillmentStatus::Pending,
            tracking_number: None,
            notes: None,
            assigned_to: None,
            picking_started: None,
            packing_started: None,
            shipping_date: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let publisher = BroadcastPublisher::default();
        let mut rx = publisher.subscribe();

        let order = sample_order();
        publisher
            .publish(ChangeEvent::new(ChangeKind::OrderCreated, order.clone()))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::OrderCreated);
        assert_eq!(event.order_id, order.id);
        assert_eq!(event.order.number, order.number);
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let publisher = BroadcastPublisher::default();
        assert_eq!(publisher.subscriber_count(), 0);

        publisher
            .publish(ChangeEvent::new(ChangeKind::StatusUpdated, sample_order()))
            .await
            .unwrap();
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = ChangeEvent::new(ChangeKind::FulfillmentUpdated, sample_order());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "fulfillment_updated");
        assert_eq!(json["order_id"], json["order"]["id"]);
    }
}
