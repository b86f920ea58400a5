//! Uniform JSON response envelope
//!
//! Every JSON endpoint answers `{success, message, data}`; errors use the
//! same shape with `success: false` and `data: null` (see [`crate::error`]).

use axum::Json;
use serde::Serialize;

/// Response wrapper shared by all JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, message: "OK".to_string(), data: Some(data) }
    }

    pub fn success_with(data: T, message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), data: Some(data) }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), data: None }
    }
}

/// Handler return type: enveloped success or an [`crate::error::ApiError`].
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, crate::error::ApiError>;

/// 200 envelope with the default "OK" message.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// 200 envelope with an explicit message.
pub fn ok_msg<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok(Json(ApiResponse::success_with(data, message)))
}

/// Page metadata attached to list responses.
///
/// `total_pages = ceil(total_items / per_page)`, zero when nothing matched.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: i64,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(current_page: u32, per_page: u32, total_items: i64) -> Self {
        let total_pages = ((total_items + per_page as i64 - 1) / per_page as i64).max(0) as u32;
        Self { current_page, total_pages, total_items, per_page }
    }
}

/// Clamp a requested page number into `1..=u32::MAX`.
pub fn clamp_page(page: Option<i64>) -> u32 {
    page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32
}

/// Clamp a requested page size into `1..=max`, with a per-endpoint default.
pub fn clamp_limit(limit: Option<i64>, default: u32, max: u32) -> u32 {
    limit.unwrap_or(default as i64).clamp(1, max as i64) as u32
}

/// OFFSET for a clamped page/limit pair.
pub fn offset(page: u32, limit: u32) -> i64 {
    (page as i64 - 1) * limit as i64
}
