//! Order lifecycle events
//!
//! Published to NATS when a client is configured. Fire and forget: a
//! publish failure is logged and never fails the request that caused it.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Created {
        order_id: i64,
        order_number: String,
        user_id: i64,
        total_amount: Decimal,
    },
    StatusChanged {
        order_id: i64,
        status: String,
    },
    PaymentConfirmed {
        order_id: i64,
        order_number: String,
    },
}

impl OrderEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Created { .. } => "orders.created",
            Self::StatusChanged { .. } => "orders.status_changed",
            Self::PaymentConfirmed { .. } => "orders.payment_confirmed",
        }
    }
}

pub async fn publish(state: &AppState, event: OrderEvent) {
    let Some(nats) = &state.nats else { return };
    let payload = match serde_json::to_vec(&event) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize order event");
            return;
        }
    };
    if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
        tracing::warn!(subject = event.subject(), error = %e, "failed to publish order event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects() {
        let event = OrderEvent::StatusChanged { order_id: 4, status: "shipped".into() };
        assert_eq!(event.subject(), "orders.status_changed");
    }

    #[test]
    fn test_event_payload_shape() {
        let event = OrderEvent::Created {
            order_id: 12,
            order_number: "SV-20260301093005-a1b2c3".into(),
            user_id: 7,
            total_amount: Decimal::new(947, 2),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "created");
        assert_eq!(json["order_id"], 12);
        assert_eq!(json["total_amount"], "9.47");
    }
}
