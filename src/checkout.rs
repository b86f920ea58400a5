//! Order operations: the cart-to-order transaction, payment processing,
//! status updates, and order reads.
//!
//! Order creation is the only multi-statement write in the service. Stock
//! is enforced twice: a read-time check that produces the friendly error,
//! and a conditional `UPDATE ... WHERE stock >= quantity` whose affected
//! row count catches checkouts racing between the two.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::cart::CartLine;
use crate::domain::order::{order_number, Order, OrderDetail, OrderItem, OrderStatus};
use crate::error::ApiError;
use crate::payments::{self, PaymentOutcome};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Option<i64>,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub guest_email: Option<String>,
}

/// Validated order input.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub shipping_address: String,
    pub payment_method: String,
    pub shipping_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub guest_email: Option<String>,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::validation(format!("Field '{field}' is required"))),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl CreateOrderRequest {
    pub fn validate(self) -> Result<NewOrder, ApiError> {
        let shipping_address = required_text(self.shipping_address, "shipping_address")?;
        let payment_method = required_text(self.payment_method, "payment_method")?;
        let guest_email = optional_text(self.guest_email);
        if let Some(email) = &guest_email {
            if !validator::validate_email(email) {
                return Err(ApiError::validation("Invalid email address"));
            }
        }
        Ok(NewOrder {
            shipping_address,
            payment_method,
            shipping_name: optional_text(self.shipping_name),
            shipping_phone: optional_text(self.shipping_phone),
            guest_email,
        })
    }
}

async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "transaction rollback failed");
    }
}

/// Validate the fetched cart against current stock and total it.
///
/// The first line whose quantity exceeds stock fails the whole cart,
/// naming its product. Lines arrive in cart read order (by product id).
fn validate_lines(lines: &[CartLine]) -> Result<Decimal, ApiError> {
    if lines.is_empty() {
        return Err(ApiError::EmptyCart);
    }
    for line in lines {
        if line.quantity > line.stock {
            return Err(ApiError::InsufficientStock(line.name.clone()));
        }
    }
    Ok(lines.iter().map(|line| line.subtotal).sum())
}

/// Convert the user's cart into an order inside one transaction.
///
/// Reads the cart joined with current stock, validates it, inserts the
/// order and its items, decrements stock conditionally, clears the cart,
/// and commits. Any domain failure rolls the whole thing back.
pub async fn create_order(
    db: &PgPool,
    user_id: i64,
    input: NewOrder,
) -> Result<OrderDetail, ApiError> {
    let mut tx = db.begin().await?;

    let lines = sqlx::query_as::<_, CartLine>(
        "SELECT c.product_id, c.quantity, p.name, p.price, p.image, p.stock, \
         (c.quantity * p.price) AS subtotal \
         FROM cart c \
         JOIN products p ON c.product_id = p.id \
         WHERE c.user_id = $1 \
         ORDER BY c.product_id",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    let total = match validate_lines(&lines) {
        Ok(total) => total,
        Err(e) => {
            rollback(tx).await;
            return Err(e);
        }
    };

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (order_number, user_id, total_amount, shipping_address, \
         payment_method, status, shipping_name, shipping_phone, guest_email) \
         VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8) \
         RETURNING id",
    )
    .bind(order_number(Utc::now()))
    .bind(user_id)
    .bind(total)
    .bind(&input.shipping_address)
    .bind(&input.payment_method)
    .bind(&input.shipping_name)
    .bind(&input.shipping_phone)
    .bind(&input.guest_email)
    .fetch_one(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *tx)
        .await?;

        // Re-proves the stock precondition at write time; a concurrent
        // checkout that drained stock since the read shows up as zero
        // affected rows.
        let decremented = sqlx::query(
            "UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1",
        )
        .bind(line.quantity)
        .bind(line.product_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            rollback(tx).await;
            return Err(ApiError::InsufficientStock(line.name.clone()));
        }
    }

    sqlx::query("DELETE FROM cart WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    order_by_id(db, order_id, None).await
}

/// Run the payment stub against a pending order and confirm it.
pub async fn process_payment(
    db: &PgPool,
    order_id: i64,
    details: &serde_json::Value,
) -> Result<Order, ApiError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(db)
        .await?
        .ok_or(ApiError::OrderNotFound)?;

    if order.status != OrderStatus::Pending.as_str() {
        return Err(ApiError::OrderAlreadyProcessed);
    }

    match payments::authorize(&order, details) {
        PaymentOutcome::Approved => {
            sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
                .bind(OrderStatus::Confirmed.as_str())
                .bind(order_id)
                .execute(db)
                .await?;
            Ok(order)
        }
        PaymentOutcome::Declined => Err(ApiError::PaymentFailed),
    }
}

/// Overwrite an order's status. No transition graph; any of the six
/// values may follow any other.
pub async fn update_status(
    db: &PgPool,
    order_id: i64,
    status: OrderStatus,
) -> Result<(), ApiError> {
    let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(order_id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::OrderNotFound);
    }
    Ok(())
}

/// One order with its items; `user_id` scopes the lookup when given.
pub async fn order_by_id(
    db: &PgPool,
    order_id: i64,
    user_id: Option<i64>,
) -> Result<OrderDetail, ApiError> {
    let order = match user_id {
        Some(uid) => {
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
                .bind(order_id)
                .bind(uid)
                .fetch_optional(db)
                .await?
        }
        None => {
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
                .bind(order_id)
                .fetch_optional(db)
                .await?
        }
    }
    .ok_or(ApiError::OrderNotFound)?;

    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price, p.name, p.image \
         FROM order_items oi \
         JOIN products p ON oi.product_id = p.id \
         WHERE oi.order_id = $1 \
         ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(db)
    .await?;

    Ok(OrderDetail { order, items })
}
