use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Assigned,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub delivery_address: String,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    pub total: f64,
    // Stored as text; parsed through OrderStatus at the API boundary.
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub delivery_address: String,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub tip: f64,
}

impl NewOrder {
    pub fn total(&self) -> f64 {
        self.subtotal + self.delivery_fee + self.tip
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// An order with its line items attached, as returned to clients.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
