//! Checkout endpoints: order creation, payment, listing, detail, status
//!
//! One route, query-dispatched: `POST /checkout` creates, `POST
//! /checkout?action=process` pays, `GET /checkout?action=orders` lists,
//! `GET /checkout?id=` fetches, `PUT /checkout?id=` updates status.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::auth::Identity;
use crate::checkout::{self, CreateOrderRequest};
use crate::domain::order::{OrderStatus, OrderSummary};
use crate::error::ApiError;
use crate::events::{self, OrderEvent};
use crate::response::{clamp_limit, clamp_page, offset, ok_msg, ApiResponse, ApiResult, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub action: Option<String>,
    pub id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub order_id: Option<i64>,
    pub payment_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<OrderSummary>,
    pub pagination: Pagination,
}

pub async fn dispatch_post(
    State(state): State<AppState>,
    identity: Identity,
    params: Result<Query<CheckoutQuery>, QueryRejection>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    let Json(payload) = body.map_err(|_| ApiError::validation("Invalid JSON input"))?;
    if params.action.as_deref() == Some("process") {
        process_payment(&state, payload).await
    } else {
        create_order(&state, identity, payload).await
    }
}

async fn create_order(
    state: &AppState,
    identity: Identity,
    payload: serde_json::Value,
) -> Result<Response, ApiError> {
    let request: CreateOrderRequest =
        serde_json::from_value(payload).map_err(|_| ApiError::validation("Invalid JSON input"))?;
    let user_id = identity.or_body(request.user_id)?;
    let input = request.validate()?;

    let detail = checkout::create_order(&state.db, user_id, input).await?;
    events::publish(
        state,
        OrderEvent::Created {
            order_id: detail.order.id,
            order_number: detail.order.order_number.clone(),
            user_id,
            total_amount: detail.order.total_amount,
        },
    )
    .await;

    Ok(Json(ApiResponse::success_with(detail, "Order created successfully")).into_response())
}

async fn process_payment(
    state: &AppState,
    payload: serde_json::Value,
) -> Result<Response, ApiError> {
    let request: PaymentRequest =
        serde_json::from_value(payload).map_err(|_| ApiError::validation("Invalid JSON input"))?;
    let order_id = request
        .order_id
        .ok_or_else(|| ApiError::validation("Order ID is required"))?;
    let details = request.payment_details.unwrap_or_else(|| serde_json::json!({}));

    let order = checkout::process_payment(&state.db, order_id, &details).await?;
    events::publish(
        state,
        OrderEvent::PaymentConfirmed { order_id, order_number: order.order_number },
    )
    .await;

    Ok(Json(ApiResponse::success_with(
        serde_json::json!({"order_id": order_id}),
        "Payment processed successfully",
    ))
    .into_response())
}

pub async fn dispatch_get(
    State(state): State<AppState>,
    identity: Identity,
    params: Result<Query<CheckoutQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    if params.action.as_deref() == Some("orders") {
        let user_id = identity.require()?;
        let list = list_orders(&state, user_id, &params).await?;
        return Ok(Json(ApiResponse::success(list)).into_response());
    }
    if let Some(id) = params.id {
        let user_id = identity.require()?;
        let detail = checkout::order_by_id(&state.db, id, Some(user_id)).await?;
        return Ok(Json(ApiResponse::success(detail)).into_response());
    }
    Err(ApiError::validation("Invalid request"))
}

pub async fn update_status(
    State(state): State<AppState>,
    params: Result<Query<CheckoutQuery>, QueryRejection>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Query(params) = params.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    let order_id = params
        .id
        .ok_or_else(|| ApiError::validation("Order ID is required"))?;
    let Json(request) = body.map_err(|_| ApiError::validation("Invalid JSON input"))?;
    let status = OrderStatus::parse(
        request
            .status
            .as_deref()
            .ok_or_else(|| ApiError::validation("Status is required"))?,
    )?;

    checkout::update_status(&state.db, order_id, status).await?;
    events::publish(
        &state,
        OrderEvent::StatusChanged { order_id, status: status.as_str().to_string() },
    )
    .await;

    ok_msg((), "Order status updated successfully")
}

struct Filters {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    category: Option<String>,
}

/// `YYYY-MM-DD` widened to a concrete instant at `time` on that day.
fn day_bound(value: &str, time: &str) -> Result<DateTime<Utc>, ApiError> {
    NaiveDateTime::parse_from_str(&format!("{value} {time}"), "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|_| ApiError::validation("Invalid date format"))
}

impl Filters {
    fn from_params(params: &CheckoutQuery) -> Result<Self, ApiError> {
        let present = |v: &Option<String>| {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        };
        let from = match present(&params.date_from) {
            Some(value) => Some(day_bound(&value, "00:00:00")?),
            None => None,
        };
        let to = match present(&params.date_to) {
            Some(value) => Some(day_bound(&value, "23:59:59")?),
            None => None,
        };
        Ok(Self { from, to, category: present(&params.category) })
    }

    fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>, user_id: i64) {
        builder.push_bind(user_id);
        if let Some(from) = self.from {
            builder.push(" AND created_at >= ");
            builder.push_bind(from);
        }
        if let Some(to) = self.to {
            builder.push(" AND created_at <= ");
            builder.push_bind(to);
        }
        if let Some(category) = &self.category {
            builder.push(
                " AND id IN (SELECT DISTINCT o.id FROM orders o \
                 JOIN order_items oi ON o.id = oi.order_id \
                 JOIN products p ON oi.product_id = p.id \
                 WHERE p.category = ",
            );
            builder.push_bind(category.clone());
            builder.push(")");
        }
    }
}

async fn list_orders(
    state: &AppState,
    user_id: i64,
    params: &CheckoutQuery,
) -> Result<OrderList, ApiError> {
    let page = clamp_page(params.page);
    let limit = clamp_limit(params.limit, 10, 50);
    let filters = Filters::from_params(params)?;

    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM orders WHERE user_id = ");
    filters.apply(&mut count_query, user_id);
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    let mut list_query = QueryBuilder::new(
        "SELECT id, order_number, total_amount, status, shipping_address, \
         payment_method, created_at FROM orders WHERE user_id = ",
    );
    filters.apply(&mut list_query, user_id);
    list_query.push(" ORDER BY created_at DESC LIMIT ");
    list_query.push_bind(limit as i64);
    list_query.push(" OFFSET ");
    list_query.push_bind(offset(page, limit));
    let orders = list_query
        .build_query_as::<OrderSummary>()
        .fetch_all(&state.db)
        .await?;

    Ok(OrderList { orders, pagination: Pagination::new(page, limit, total) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds() {
        let from = day_bound("2026-03-01", "00:00:00").unwrap();
        assert_eq!(from.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        let to = day_bound("2026-03-01", "23:59:59").unwrap();
        assert_eq!(to.to_rfc3339(), "2026-03-01T23:59:59+00:00");
    }

    #[test]
    fn test_day_bound_rejects_garbage() {
        assert!(day_bound("2026-13-40", "00:00:00").is_err());
        assert!(day_bound("yesterday", "00:00:00").is_err());
        assert_eq!(
            day_bound("03/01/2026", "00:00:00").unwrap_err().to_string(),
            "Invalid date format"
        );
    }

    #[test]
    fn test_blank_filters_ignored() {
        let params = CheckoutQuery {
            action: None,
            id: None,
            page: None,
            limit: None,
            date_from: Some("  ".to_string()),
            date_to: None,
            category: Some(String::new()),
        };
        let filters = Filters::from_params(&params).unwrap();
        assert!(filters.from.is_none());
        assert!(filters.to.is_none());
        assert!(filters.category.is_none());
    }
}
