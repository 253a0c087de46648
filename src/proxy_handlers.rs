//! Pass-through handlers for the BrokerEdge microservice.
//!
//! OTP verification state lives in an upstream session cookie, so these
//! handlers forward bodies verbatim and carry cookies in both directions:
//! the browser's `Cookie` header goes upstream on validation, and the
//! upstream `Set-Cookie` comes back on issuance.

use crate::broker_client::ProxiedResponse;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::QrRequest;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

fn incoming_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Build the client response from an upstream reply, forwarding status, JSON
/// body and (when requested) the upstream session cookie.
fn passthrough_response(
    proxied: ProxiedResponse,
    forward_cookie: bool,
) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(proxied.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json");
    if forward_cookie {
        if let Some(cookie) = proxied.set_cookie {
            builder = builder.header(header::SET_COOKIE, cookie);
        }
    }

    builder
        .body(Body::from(proxied.body))
        .map_err(|e| AppError::Internal(format!("Failed to build proxy response: {}", e)))
}

/// POST /api/v1/otp/send → BrokerEdge `/send_otp_clean`
pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AppError> {
    let proxied = state.broker_client.send_otp(&body).await?;
    passthrough_response(proxied, true)
}

/// POST /api/v1/otp/validate → BrokerEdge `/validate_otp_clean`
pub async fn validate_otp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AppError> {
    let cookie = incoming_cookie(&headers);
    let proxied = state
        .broker_client
        .validate_otp(&body, cookie.as_deref())
        .await?;
    passthrough_response(proxied, true)
}

/// POST /api/v1/images/decode → BrokerEdge `/load_base_64_disc`
pub async fn decode_image(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AppError> {
    let proxied = state.broker_client.decode_image(&body, None).await?;
    passthrough_response(proxied, true)
}

/// POST /api/v1/qr → BrokerEdge `/string_to_qr`
pub async fn generate_qr(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QrRequest>,
) -> Result<Response, AppError> {
    let proxied = state.broker_client.generate_qr(&req.text).await?;
    passthrough_response(proxied, false)
}
