//! HTTP surface
//!
//! Routes mirror the storefront's URL contract: one path per resource
//! with `action`/`id` query parameters selecting the operation. Unknown
//! paths and unsupported methods answer with the JSON envelope too.

pub mod cart;
pub mod invoices;
pub mod orders;
pub mod products;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "shopverse"}))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/products",
            get(products::dispatch_get)
                .post(products::create)
                .put(products::update)
                .delete(products::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/cart",
            get(cart::list)
                .post(cart::add)
                .put(cart::set_quantity)
                .delete(cart::remove)
                .fallback(method_not_allowed),
        )
        .route(
            "/checkout",
            get(orders::dispatch_get)
                .post(orders::dispatch_post)
                .put(orders::update_status)
                .fallback(method_not_allowed),
        )
        .route(
            "/invoice",
            get(invoices::dispatch_get)
                .post(invoices::email)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
