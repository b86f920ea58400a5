//! Invoice assembly and rendering
//!
//! An invoice is assembled fresh from the order on every request and
//! never persisted. Customer details fall back from the `users` row to
//! the order's guest snapshot; item names fall back to a placeholder
//! when the product has been deleted since purchase.

pub mod html;
pub mod pdf;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::ApiError;

/// Static shop identity printed on every invoice.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ShopInfo {
    pub name: &'static str,
    pub logo: &'static str,
    pub tagline: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
    pub website: &'static str,
}

pub const SHOP: ShopInfo = ShopInfo {
    name: "Supershop",
    logo: "🛒",
    tagline: "Your One-Stop Shopping Destination",
    address: "123 Business Street, Commerce City, CC 12345",
    phone: "+1 (555) 123-SHOP",
    email: "support@supershop.com",
    website: "www.supershop.com",
};

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub shipping_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItem {
    pub name: String,
    pub image: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub order_number: String,
    pub order_date: String,
    pub invoice_date: String,
    pub status: String,
    pub payment_method: String,
    pub shop: ShopInfo,
    pub customer: Customer,
    pub items: Vec<InvoiceItem>,
    pub totals: InvoiceTotals,
}

impl Invoice {
    pub fn filename(&self, extension: &str) -> String {
        format!("invoice-{}.{}", self.order_number, extension)
    }
}

/// Human name for a payment method code; unknown codes are capitalized.
pub fn payment_method_name(method: &str) -> String {
    match method {
        "cod" => "Cash on Delivery".to_string(),
        "card" => "Credit/Debit Card".to_string(),
        "mobile" => "Mobile Payment".to_string(),
        other => capitalize(other),
    }
}

pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceOrderRow {
    order_number: String,
    total_amount: Decimal,
    shipping_address: String,
    payment_method: String,
    status: String,
    shipping_phone: Option<String>,
    created_at: DateTime<Utc>,
    customer_name: Option<String>,
    customer_email: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceItemRow {
    quantity: i32,
    price: Decimal,
    name: String,
    image: String,
}

/// Read an order and shape it into an [`Invoice`].
pub async fn assemble(db: &PgPool, order_id: i64) -> Result<Invoice, ApiError> {
    let order = sqlx::query_as::<_, InvoiceOrderRow>(
        "SELECT o.order_number, o.total_amount, o.shipping_address, o.payment_method, \
         o.status, o.shipping_phone, o.created_at, \
         COALESCE(u.name, o.shipping_name) AS customer_name, \
         COALESCE(u.email, o.guest_email) AS customer_email \
         FROM orders o \
         LEFT JOIN users u ON o.user_id = u.id \
         WHERE o.id = $1",
    )
    .bind(order_id)
    .fetch_optional(db)
    .await?
    .ok_or(ApiError::OrderNotFound)?;

    let items = sqlx::query_as::<_, InvoiceItemRow>(
        "SELECT oi.quantity, oi.price, \
         COALESCE(p.name, 'Product #' || oi.product_id) AS name, \
         COALESCE(p.image, '') AS image \
         FROM order_items oi \
         LEFT JOIN products p ON oi.product_id = p.id \
         WHERE oi.order_id = $1 \
         ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(db)
    .await?;

    Ok(build(order, items, Utc::now()))
}

fn build(order: InvoiceOrderRow, rows: Vec<InvoiceItemRow>, now: DateTime<Utc>) -> Invoice {
    let invoice_number = format!(
        "INV-{}",
        order.order_number.strip_prefix("SV-").unwrap_or(&order.order_number)
    );

    let items: Vec<InvoiceItem> = rows
        .into_iter()
        .map(|row| InvoiceItem {
            name: row.name,
            image: row.image,
            quantity: row.quantity,
            unit_price: row.price,
            total_price: row.price * Decimal::from(row.quantity),
        })
        .collect();
    let subtotal = items.iter().map(|item| item.total_price).sum();

    Invoice {
        invoice_number,
        order_number: order.order_number,
        order_date: order.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        invoice_date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        status: order.status,
        payment_method: order.payment_method,
        shop: SHOP,
        customer: Customer {
            name: order.customer_name,
            email: order.customer_email,
            phone: order.shipping_phone,
            shipping_address: order.shipping_address,
        },
        items,
        totals: InvoiceTotals {
            // Tax and shipping are not modeled; the totals block still
            // carries them so renderers and consumers see a full summary.
            subtotal,
            tax_amount: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            total_amount: order.total_amount,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_row() -> InvoiceOrderRow {
        InvoiceOrderRow {
            order_number: "SV-20260301093005-a1b2c3".to_string(),
            total_amount: Decimal::new(947, 2),
            shipping_address: "12 Main St, Springfield".to_string(),
            payment_method: "cod".to_string(),
            status: "pending".to_string(),
            shipping_phone: Some("+1 555 0100".to_string()),
            created_at: "2026-03-01T09:30:05Z".parse().unwrap(),
            customer_name: Some("Ada".to_string()),
            customer_email: None,
        }
    }

    fn item_rows() -> Vec<InvoiceItemRow> {
        vec![
            InvoiceItemRow {
                quantity: 2,
                price: Decimal::new(299, 2),
                name: "Fresh Bananas".to_string(),
                image: String::new(),
            },
            InvoiceItemRow {
                quantity: 1,
                price: Decimal::new(349, 2),
                name: "Product #9".to_string(),
                image: String::new(),
            },
        ]
    }

    #[test]
    fn test_invoice_number_derivation() {
        let invoice = build(order_row(), vec![], Utc::now());
        assert_eq!(invoice.invoice_number, "INV-20260301093005-a1b2c3");
    }

    #[test]
    fn test_totals() {
        let invoice = build(order_row(), item_rows(), Utc::now());
        assert_eq!(invoice.totals.subtotal, Decimal::new(947, 2));
        assert_eq!(invoice.totals.tax_amount, Decimal::ZERO);
        assert_eq!(invoice.totals.shipping_cost, Decimal::ZERO);
        assert_eq!(invoice.totals.total_amount, Decimal::new(947, 2));
        assert_eq!(invoice.items[0].total_price, Decimal::new(598, 2));
    }

    #[test]
    fn test_dates_formatted() {
        let now = "2026-03-02T10:00:00Z".parse().unwrap();
        let invoice = build(order_row(), vec![], now);
        assert_eq!(invoice.order_date, "2026-03-01 09:30:05");
        assert_eq!(invoice.invoice_date, "2026-03-02 10:00:00");
    }

    #[test]
    fn test_payment_method_names() {
        assert_eq!(payment_method_name("cod"), "Cash on Delivery");
        assert_eq!(payment_method_name("card"), "Credit/Debit Card");
        assert_eq!(payment_method_name("mobile"), "Mobile Payment");
        assert_eq!(payment_method_name("paypal"), "Paypal");
        assert_eq!(payment_method_name(""), "");
    }

    #[test]
    fn test_filename() {
        let invoice = build(order_row(), vec![], Utc::now());
        assert_eq!(invoice.filename("pdf"), "invoice-SV-20260301093005-a1b2c3.pdf");
    }
}
