//! Payment authorization seam
//!
//! A real gateway integration replaces this module wholesale; the rest
//! of the service only sees [`PaymentOutcome`]. The demo authorizer
//! approves everything, but callers handle the declined arm so wiring a
//! gateway in does not touch them.

use crate::domain::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved,
    Declined,
}

/// Authorize a payment for `order`. `details` is whatever the client
/// submitted as `payment_details`; a gateway would consume it.
pub fn authorize(_order: &Order, _details: &serde_json::Value) -> PaymentOutcome {
    PaymentOutcome::Approved
}
