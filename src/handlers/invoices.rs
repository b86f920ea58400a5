//! Invoice endpoints
//!
//! `GET /invoice?action={generate|download|view}` and `POST
//! /invoice?action=email`. Generate wraps the rendering in the JSON
//! envelope (PDF bytes as base64); download and view return raw bodies.
//! Lookups are scoped by order id alone.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::ApiError;
use crate::invoice::{self, html, pdf};
use crate::response::{ok_msg, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub action: Option<String>,
    pub order_id: Option<i64>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub order_id: Option<i64>,
    pub email: Option<String>,
}

fn required_order_id(params: &InvoiceQuery) -> Result<i64, ApiError> {
    params
        .order_id
        .ok_or_else(|| ApiError::validation("Order ID is required"))
}

pub async fn dispatch_get(
    State(state): State<AppState>,
    params: Result<Query<InvoiceQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    match params.action.as_deref() {
        Some("generate") => generate(&state, &params).await,
        Some("download") => download(&state, &params).await,
        Some("view") => view(&state, &params).await,
        Some(_) => Err(ApiError::validation("Invalid action")),
        None => Err(ApiError::validation("Action required")),
    }
}

async fn generate(state: &AppState, params: &InvoiceQuery) -> Result<Response, ApiError> {
    let invoice = invoice::assemble(&state.db, required_order_id(params)?).await?;
    let response = match params.format.as_deref() {
        Some("html") => Json(ApiResponse::success_with(
            serde_json::json!({"html": html::render(&invoice)}),
            "HTML invoice generated",
        ))
        .into_response(),
        Some("pdf") => Json(ApiResponse::success_with(
            serde_json::json!({
                "pdf_content": STANDARD.encode(pdf::render(&invoice)),
                "filename": invoice.filename("pdf"),
            }),
            "PDF invoice generated",
        ))
        .into_response(),
        // Anything else falls back to the plain JSON invoice.
        _ => Json(ApiResponse::success_with(invoice, "Invoice generated successfully"))
            .into_response(),
    };
    Ok(response)
}

fn attachment(filename: String, content_type: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

async fn download(state: &AppState, params: &InvoiceQuery) -> Result<Response, ApiError> {
    let invoice = invoice::assemble(&state.db, required_order_id(params)?).await?;
    match params.format.as_deref().unwrap_or("pdf") {
        "pdf" => Ok(attachment(
            invoice.filename("pdf"),
            "application/pdf",
            pdf::render(&invoice),
        )),
        "html" => Ok(attachment(
            invoice.filename("html"),
            "text/html; charset=utf-8",
            html::render(&invoice).into_bytes(),
        )),
        "json" => {
            let body = serde_json::to_vec_pretty(&invoice)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            Ok(attachment(
                invoice.filename("json"),
                "application/json",
                body,
            ))
        }
        _ => Err(ApiError::validation(
            "Invalid format. Supported formats: pdf, html, json",
        )),
    }
}

async fn view(state: &AppState, params: &InvoiceQuery) -> Result<Response, ApiError> {
    let invoice = invoice::assemble(&state.db, required_order_id(params)?).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8".to_string())],
        html::render(&invoice),
    )
        .into_response())
}

pub async fn email(
    State(state): State<AppState>,
    params: Result<Query<InvoiceQuery>, QueryRejection>,
    body: Result<Json<EmailRequest>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Query(params) = params.map_err(|_| ApiError::validation("Invalid query parameters"))?;
    if params.action.as_deref() != Some("email") {
        return Err(ApiError::validation("Invalid action"));
    }
    let Json(request) = body.map_err(|_| ApiError::validation("Invalid JSON input"))?;

    let email = request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    let (order_id, email) = match (request.order_id, email) {
        (Some(order_id), Some(email)) => (order_id, email),
        _ => return Err(ApiError::validation("Order ID and email are required")),
    };
    if !validator::validate_email(&email) {
        return Err(ApiError::validation("Invalid email address"));
    }

    let invoice = invoice::assemble(&state.db, order_id).await?;

    // No mail transport in this service; the send is simulated.
    tracing::info!(order_id, recipient = %email, "invoice email simulated");
    ok_msg(
        serde_json::json!({
            "email_sent": true,
            "recipient": email,
            "invoice_number": invoice.invoice_number,
        }),
        "Invoice sent successfully",
    )
}
