use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle states an order can be in. Checkout only ever writes
/// `Pending`; the later transitions belong to fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{other}'")),
        }
    }
}

/// One cart line joined with the item it references, as read inside the
/// checkout transaction. `stock` is the value the availability decision
/// and the later decrement are both based on.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub stock: i32,
}

/// Shortfall entry for a cart line whose requested quantity exceeds the
/// stock read in the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableLine {
    pub item_id: Uuid,
    pub name: String,
    pub requested: i32,
    pub available: i32,
}

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub id: Uuid,
    pub tracking_id: String,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: Uuid,
    pub tracking_id: String,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A snapshot line enriched with the item's current name and image for
/// display. Quantity and unit price come from the snapshot, not the item.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub item_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub id: Uuid,
    pub tracking_id: String,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("Refunded".parse::<OrderStatus>().is_err());
        assert!("pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn unavailable_line_serializes_camel_case() {
        let line = UnavailableLine {
            item_id: Uuid::nil(),
            name: "Masala Chai".to_string(),
            requested: 7,
            available: 5,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["itemId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["name"], "Masala Chai");
        assert_eq!(json["requested"], 7);
        assert_eq!(json["available"], 5);
    }
}
