//! API error taxonomy
//!
//! One enum for every failure a handler can surface. `IntoResponse` maps
//! each variant to an HTTP status and the standard `{success, message,
//! data}` envelope, so handlers just return `Err(...)` with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request input; the message is shown to the caller verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Cart is empty")]
    EmptyCart,

    /// Names the first cart line whose quantity exceeds stock.
    #[error("Insufficient stock for product: {0}")]
    InsufficientStock(String),

    #[error("Order has already been processed")]
    OrderAlreadyProcessed,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("Payment processing failed")]
    PaymentFailed,

    #[error("User authentication required")]
    Unauthenticated,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Storage failures surface verbatim; this is an internal tool.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::EmptyCart
            | Self::InsufficientStock(_)
            | Self::OrderAlreadyProcessed
            | Self::InvalidStatus
            | Self::PaymentFailed => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::OrderNotFound | Self::ProductNotFound | Self::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Database(ref e) = self {
            tracing::error!(error = %e, "database failure");
        }
        let body = ApiResponse::error(self.to_string());
        (self.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status() {
        assert_eq!(ApiError::EmptyCart.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unauthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.http_status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolClosed).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            ApiError::InsufficientStock("Milk".into()).to_string(),
            "Insufficient stock for product: Milk"
        );
        assert_eq!(
            ApiError::validation("Field 'name' is required").to_string(),
            "Field 'name' is required"
        );
        assert_eq!(
            ApiError::Unauthenticated.to_string(),
            "User authentication required"
        );
    }
}
