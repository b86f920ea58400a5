//! Cart endpoints
//!
//! All cart operations require a resolved caller identity. Lines are
//! keyed (user_id, product_id); re-adding a product accumulates its
//! quantity.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::domain::cart::{CartLine, CartView};
use crate::error::ApiError;
use crate::response::{ok, ok_msg, ApiResult};
use crate::state::AppState;

/// The cart row as stored, echoed back by mutations.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CartEntry {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub user_id: Option<i64>,
    pub product_id: Option<i64>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LineParam {
    pub product_id: Option<i64>,
}

fn check_quantity(quantity: i32) -> Result<i32, ApiError> {
    if quantity < 1 {
        return Err(ApiError::validation("Quantity must be at least 1"));
    }
    Ok(quantity)
}

/// A product deleted between the existence check and the insert shows
/// up as a foreign key violation; report it as a missing product.
fn map_insert_error(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return ApiError::ProductNotFound;
        }
    }
    ApiError::from(e)
}

pub async fn list(State(state): State<AppState>, identity: Identity) -> ApiResult<CartView> {
    let user_id = identity.require()?;

    let lines = sqlx::query_as::<_, CartLine>(
        "SELECT c.product_id, c.quantity, p.name, p.price, p.image, p.stock, \
         (c.quantity * p.price) AS subtotal \
         FROM cart c \
         JOIN products p ON c.product_id = p.id \
         WHERE c.user_id = $1 \
         ORDER BY c.product_id",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    ok(CartView::new(lines))
}

pub async fn add(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<AddRequest>, JsonRejection>,
) -> ApiResult<CartEntry> {
    let Json(request) = body.map_err(|_| ApiError::validation("Invalid JSON input"))?;
    let user_id = identity.or_body(request.user_id)?;
    let product_id = request
        .product_id
        .ok_or_else(|| ApiError::validation("Field 'product_id' is required"))?;
    let quantity = check_quantity(request.quantity.unwrap_or(1))?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(ApiError::ProductNotFound);
    }

    let entry = sqlx::query_as::<_, CartEntry>(
        "INSERT INTO cart (user_id, product_id, quantity) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, product_id) \
         DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity \
         RETURNING product_id, quantity",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(&state.db)
    .await
    .map_err(map_insert_error)?;

    ok_msg(entry, "Item added to cart")
}

pub async fn set_quantity(
    State(state): State<AppState>,
    identity: Identity,
    param: Result<Query<LineParam>, QueryRejection>,
    body: Result<Json<QuantityRequest>, JsonRejection>,
) -> ApiResult<CartEntry> {
    let Query(param) = param.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    let user_id = identity.require()?;
    let product_id = param
        .product_id
        .ok_or_else(|| ApiError::validation("Product ID is required"))?;
    let Json(request) = body.map_err(|_| ApiError::validation("Invalid JSON input"))?;
    let quantity = check_quantity(
        request
            .quantity
            .ok_or_else(|| ApiError::validation("Field 'quantity' is required"))?,
    )?;

    let entry = sqlx::query_as::<_, CartEntry>(
        "UPDATE cart SET quantity = $3 \
         WHERE user_id = $1 AND product_id = $2 \
         RETURNING product_id, quantity",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::ProductNotFound)?;

    ok_msg(entry, "Cart updated")
}

pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    param: Result<Query<LineParam>, QueryRejection>,
) -> ApiResult<()> {
    let Query(param) = param.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    let user_id = identity.require()?;

    match param.product_id {
        Some(product_id) => {
            let result = sqlx::query("DELETE FROM cart WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(&state.db)
                .await?;
            if result.rows_affected() == 0 {
                return Err(ApiError::ProductNotFound);
            }
            ok_msg((), "Item removed from cart")
        }
        None => {
            sqlx::query("DELETE FROM cart WHERE user_id = $1")
                .bind(user_id)
                .execute(&state.db)
                .await?;
            ok_msg((), "Cart cleared")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct FkViolation;

    impl fmt::Display for FkViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message())
        }
    }

    impl StdError for FkViolation {}

    impl DatabaseError for FkViolation {
        fn message(&self) -> &str {
            "insert or update on table \"cart\" violates foreign key constraint \"cart_product_id_fkey\""
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::ForeignKeyViolation
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn test_insert_foreign_key_violation_is_missing_product() {
        let err = map_insert_error(sqlx::Error::Database(Box::new(FkViolation)));
        assert!(matches!(err, ApiError::ProductNotFound));
    }

    #[test]
    fn test_other_insert_errors_stay_database_errors() {
        let err = map_insert_error(sqlx::Error::PoolClosed);
        assert!(matches!(err, ApiError::Database(_)));
    }
}
