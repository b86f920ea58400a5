//! Cart rows joined with their product

use rust_decimal::Decimal;
use serde::Serialize;

/// One cart line joined with the product's current name, price, image and
/// stock; `subtotal` is `quantity * price` computed in SQL.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i32,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub stock: i32,
    pub subtotal: Decimal,
}

/// Cart listing payload: the lines plus their summed subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
}

impl CartView {
    pub fn new(items: Vec<CartLine>) -> Self {
        let subtotal = items.iter().map(|line| line.subtotal).sum();
        Self { items, subtotal }
    }
}
