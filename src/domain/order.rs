use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfillment state of an order.
///
/// Orders start `Pending` and advance only through the lifecycle
/// controller: `Pending -> OutForDelivery -> Delivered`, with
/// `Pending -> Cancelled` as the one side exit. `Delivered` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// One line of a committed order. `unit_price` is frozen at checkout time,
/// so later menu price edits never touch past orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub menu_item: u64,
    #[serde(default)]
    pub menu_item_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub subtotal: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// A committed, priced cart tracked through the fulfillment lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub delivery_crew_name: Option<String>,
    pub status: OrderStatus,
    pub total: f64,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub order_date: DateTime<Utc>,
}

impl Order {
    /// The order total recomputed from its lines.
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// Payload for placing an order from the current cart.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCreate {
    pub delivery_address: String,
}
