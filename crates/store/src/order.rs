//! Order records, status enumerations, and the status transition table.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, Sku};
use serde::{Deserialize, Serialize};

/// Customer-facing order status.
///
/// Allowed transitions:
/// ```text
/// pending ──► confirmed ──► processing ──► shipped ──► delivered
///    │            │              │            │
///    └────────────┴──────────────┴────────────┴──► cancelled
/// ```
/// Forward jumps along the chain are allowed (operators skip steps when
/// correcting orders); moving backwards is not. Re-entering the current
/// status is a permitted no-op, which keeps the shipped transition
/// idempotent with respect to tracking-number generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position along the forward chain; `None` for cancelled.
    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Returns true if this status may transition to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == *self {
            return true;
        }
        if next == OrderStatus::Cancelled {
            return true;
        }
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status of an order. Carried on the record; payment processing
/// itself lives outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Warehouse-operations sub-state of an order, distinct from the
/// customer-facing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[default]
    Pending,
    Picking,
    Packing,
    ReadyToShip,
    Shipped,
    Delivered,
}

impl FulfillmentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "pending",
            FulfillmentStatus::Picking => "picking",
            FulfillmentStatus::Packing => "packing",
            FulfillmentStatus::ReadyToShip => "ready_to_ship",
            FulfillmentStatus::Shipped => "shipped",
            FulfillmentStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Customer identity attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Shipping address attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// A line item embedded in an order.
///
/// Product name, SKU, and unit price are denormalized at order time; later
/// product edits do not rewrite placed orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub sku: Sku,
    pub quantity: u32,
    pub unit_price: Money,
    /// `quantity × unit_price`.
    pub total: Money,
}

impl OrderItem {
    /// Creates a line item, computing the line total.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        sku: Sku,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            sku,
            quantity,
            unit_price,
            total: unit_price.multiply(quantity),
        }
    }
}

/// An order record. Owns its line items; items have no independent
/// lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,

    /// Human-readable, time-based order number. Display-only.
    pub number: String,

    pub customer: Customer,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,

    /// Sum of line totals, computed at creation.
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    /// `subtotal + tax + shipping`, computed at creation.
    pub total: Money,

    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,

    /// Carrier-facing shipment identifier, generated at the shipped
    /// transition.
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    /// Warehouse actor handling fulfillment.
    pub assigned_to: Option<String>,

    /// Milestone timestamps, each recorded the first time the respective
    /// fulfillment state is entered.
    pub picking_started: Option<DateTime<Utc>>,
    pub packing_started: Option<DateTime<Utc>>,
    pub shipping_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an order: everything the store assigns is absent.
///
/// Totals arrive precomputed; the lifecycle controller computes them from
/// line items at creation and they are never recomputed afterwards.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer: Customer,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

/// Partial update for an order; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    pub picking_started: Option<DateTime<Utc>>,
    pub packing_started: Option<DateTime<Utc>>,
    pub shipping_date: Option<DateTime<Utc>>,
}

impl OrderPatch {
    /// Applies the provided fields to the order.
    pub fn apply(&self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(payment_status) = self.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(fulfillment_status) = self.fulfillment_status {
            order.fulfillment_status = fulfillment_status;
        }
        if let Some(tracking_number) = &self.tracking_number {
            order.tracking_number = Some(tracking_number.clone());
        }
        if let Some(notes) = &self.notes {
            order.notes = Some(notes.clone());
        }
        if let Some(assigned_to) = &self.assigned_to {
            order.assigned_to = Some(assigned_to.clone());
        }
        if let Some(picking_started) = self.picking_started {
            order.picking_started = Some(picking_started);
        }
        if let Some(packing_started) = self.packing_started {
            order.packing_started = Some(packing_started);
        }
        if let Some(shipping_date) = self.shipping_date {
            order.shipping_date = Some(shipping_date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_forward_jumps_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_admit_no_transitions() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_reentering_current_status_allowed() {
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        let json = serde_json::to_string(&FulfillmentStatus::ReadyToShip).unwrap();
        assert_eq!(json, "\"ready_to_ship\"");
    }

    #[test]
    fn test_order_item_computes_line_total() {
        let item = OrderItem::new(
            ProductId::new(),
            "Rice 5kg",
            Sku::new("RICE-5KG"),
            3,
            Money::from_cents(450),
        );
        assert_eq!(item.total.cents(), 1350);
    }

    #[test]
    fn test_patch_sets_tracking_number_without_clearing_notes() {
        let mut order = sample_order();
        order.notes = Some("leave at door".to_string());

        let patch = OrderPatch {
            status: Some(OrderStatus::Shipped),
            tracking_number: Some("TRK123ABC".to_string()),
            ..OrderPatch::default()
        };
        patch.apply(&mut order);

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_number.as_deref(), Some("TRK123ABC"));
        assert_eq!(order.notes.as_deref(), Some("leave at door"));
    }

    fn sample_order() -> Order {
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
            items: vec![],
            subtotal: Money::zero(),
            tax: Money::zero(),
            shipping: Money::zero(),
            total: Money::zero(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            fulfillment_status: FulfillmentStatus::Pending,
            tracking_number: None,
            notes: None,
            assigned_to: None,
            picking_started: None,
            packing_started: None,
            shipping_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
