use crate::broker_client::BrokerEdgeClient;
use crate::config::Config;
use crate::errors::AppError;
use crate::lead_storage::LeadStorage;
use crate::models::*;
use crate::services::{SmsDelivery, SmsService};
use crate::session::{
    self, AdvanceFunnelRequest, FunnelSession, FunnelSessionCache, StartFunnelRequest,
};
use crate::validators::{is_valid_sa_id, is_valid_sa_mobile};
use crate::vcard::{build_vcard, vcard_file_name, VcardLibrary};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Lead store connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Client for the BrokerEdge OTP/QR/decode microservice.
    pub broker_client: BrokerEdgeClient,
    /// Server-side wizard state, expiring with the funnel TTL.
    pub funnel_sessions: FunnelSessionCache,
    /// Serializes vCard directory writes against the delete-all operation.
    pub vcard_lock: Mutex<()>,
}

/// Health check endpoint, exempt from rate limiting.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-leads-api",
            "version": "0.1.0"
        })),
    )
}

fn require_signup_fields(name: &str, surname: &str, mobile: &str) -> Result<(), AppError> {
    if name.trim().is_empty() || surname.trim().is_empty() || mobile.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please fill in all required fields.".to_string(),
        ));
    }
    if !is_valid_sa_mobile(mobile) {
        return Err(AppError::BadRequest(
            "Please enter a valid South African mobile number (e.g. 0712345678).".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/leads
///
/// Stores a plain campaign lead and returns the inserted row.
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewLeadRequest>,
) -> Result<Json<InsertResponse<Lead>>, AppError> {
    tracing::info!("POST /leads - {} {}", req.name, req.surname);
    require_signup_fields(&req.name, &req.surname, &req.mobile)?;

    let lead = LeadStorage::new(state.db.clone()).insert_lead(&req).await?;
    Ok(Json(InsertResponse::of(lead)))
}

/// POST /api/v1/pre-event-leads
///
/// Stores a wellness-day pre-registration; the returned row carries the
/// store-generated `lead_id` and `lead_code` reference number.
pub async fn create_pre_event_lead(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreEventLeadRequest>,
) -> Result<Json<InsertResponse<PreEventLead>>, AppError> {
    tracing::info!("POST /pre-event-leads - {} {}", req.name, req.surname);
    require_signup_fields(&req.name, &req.surname, &req.mobile)?;

    let lead = LeadStorage::new(state.db.clone())
        .insert_pre_event_lead(&req)
        .await?;
    Ok(Json(InsertResponse::of(lead)))
}

/// POST /api/v1/vehicle-quotes
///
/// Stores a vehicle quote request. On top of the sign-up fields this
/// validates the SA ID checksum before touching the store.
pub async fn create_vehicle_quote(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VehicleQuoteRequest>,
) -> Result<Json<InsertResponse<VehicleQuote>>, AppError> {
    tracing::info!("POST /vehicle-quotes - {} {}", req.name, req.surname);
    require_signup_fields(&req.name, &req.surname, &req.mobile)?;
    if !is_valid_sa_id(&req.id_number) {
        return Err(AppError::BadRequest(
            "Please enter a valid South African ID number.".to_string(),
        ));
    }

    let quote = LeadStorage::new(state.db.clone())
        .insert_vehicle_quote(&req)
        .await?;
    Ok(Json(InsertResponse::of(quote)))
}

/// POST /api/v1/sms/send
///
/// Normalizes the number and sends one SMS through Clickatell. Gateway
/// rejections propagate the upstream status.
pub async fn send_sms(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SmsRequest>,
) -> Result<Response, AppError> {
    if req.phone_number.trim().is_empty() || req.message_content.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Phone number and message content are required.".to_string(),
        ));
    }

    let sms = SmsService::new(&state.config);
    match sms.send(&req.phone_number, &req.message_content).await? {
        SmsDelivery::Sent(response) => Ok(Json(SmsResponse {
            success: true,
            message: "SMS sent successfully.".to_string(),
            response: Some(response),
        })
        .into_response()),
        SmsDelivery::Rejected { status, message } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok((
                status,
                Json(SmsResponse {
                    success: false,
                    message,
                    response: None,
                }),
            )
                .into_response())
        }
    }
}

/// POST /api/v1/contact-cards
///
/// Builds a vCard for the registrant, stores it in the shared library, and
/// returns it as a downloadable attachment.
pub async fn create_contact_card(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactCardRequest>,
) -> Result<Response, AppError> {
    require_signup_fields(&req.name, &req.surname, &req.mobile)?;

    let card = build_vcard(&req);
    let file_name = vcard_file_name(&req.name, &req.surname);

    let library = VcardLibrary::new(&state.config.vcards_dir);
    {
        let _guard = state.vcard_lock.lock().await;
        library.write_card(&file_name, &card).await?;
    }

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/vcard; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(card.into())
        .map_err(|e| AppError::Internal(format!("Failed to build vCard response: {}", e)))?;
    Ok(response)
}

/// POST /api/v1/contact-cards/empty
///
/// Deletes every card in the library. Broker operators run this after an
/// event once the cards have been imported.
pub async fn empty_vcard_library(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmptyLibraryResponse>, AppError> {
    let library = VcardLibrary::new(&state.config.vcards_dir);
    let deleted = {
        let _guard = state.vcard_lock.lock().await;
        library.empty().await?
    };
    Ok(Json(EmptyLibraryResponse {
        success: true,
        deleted,
    }))
}

// ---------------------------------------------------------------------------
// Funnel sessions
// ---------------------------------------------------------------------------

fn session_body(session: FunnelSession) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "session": session,
    }))
}

/// POST /api/v1/funnel/sessions
pub async fn start_funnel_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartFunnelRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = session::start_session(&state.funnel_sessions, &req).await?;
    Ok(session_body(session))
}

/// GET /api/v1/funnel/sessions/:token
pub async fn get_funnel_session(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = session::fetch_session(&state.funnel_sessions, &token).await?;
    Ok(session_body(session))
}

/// POST /api/v1/funnel/sessions/:token/advance
pub async fn advance_funnel_session(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(req): Json<AdvanceFunnelRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = session::advance_session(&state.funnel_sessions, &token, &req).await?;
    Ok(session_body(session))
}
