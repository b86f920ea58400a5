//! Shopverse - Storefront Backend
//!
//! Self-hosted e-commerce backend for the Supershop storefront.
//!
//! ## Features
//! - Product catalog with search, category filters, and pagination
//! - Per-user cart with accumulate-on-add semantics
//! - Transactional checkout with conditional stock decrements
//! - Order management and a swappable payment stub
//! - Invoices rendered as JSON, escaped HTML, or a minimal PDF

pub mod auth;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod handlers;
pub mod invoice;
pub mod payments;
pub mod response;
pub mod state;

pub use error::ApiError;
pub use response::{ApiResponse, ApiResult};
pub use state::AppState;
