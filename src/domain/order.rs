//! Order types, status set, and order-number generation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// The fixed status set. Stored as plain text in `orders.status`; this
/// enum gates what callers may write, there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ApiError::InvalidStatus),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub payment_method: String,
    pub status: String,
    pub shipping_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub guest_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Slimmer row returned by the order list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: i64,
    pub order_number: String,
    pub total_amount: Decimal,
    pub status: String,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

/// Order line joined with the product's current name and image.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// `SV-<UTC timestamp>-<6 hex>`. Uniqueness rests on the column's UNIQUE
/// constraint; a collision surfaces as a storage error.
pub fn order_number(now: DateTime<Utc>) -> String {
    let noise: [u8; 3] = rand::random();
    format!(
        "SV-{}-{:02x}{:02x}{:02x}",
        now.format("%Y%m%d%H%M%S"),
        noise[0],
        noise[1],
        noise[2]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!(matches!(
            OrderStatus::parse("refunded"),
            Err(ApiError::InvalidStatus)
        ));
        assert!(matches!(
            OrderStatus::parse("Pending"),
            Err(ApiError::InvalidStatus)
        ));
    }

    #[test]
    fn test_order_number_shape() {
        let now = "2026-03-01T09:30:05Z".parse().unwrap();
        let number = order_number(now);
        assert_eq!(number.len(), 24);
        assert!(number.starts_with("SV-20260301093005-"));
        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
