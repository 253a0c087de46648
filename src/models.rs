use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Persistent rows (write-once from this service's perspective)
// ---------------------------------------------------------------------------

/// A captured prospect in the `leads` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    pub consent: bool,
    pub lead_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A pre-event registration in `pre_reg_lead`.
///
/// `lead_id` and `lead_code` are generated by the store on insert; the code is
/// the reference number quoted in confirmation email and SMS.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PreEventLead {
    pub lead_id: i64,
    pub lead_code: String,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    pub is_discovery_customer: bool,
    pub has_vitality: bool,
    pub products: Vec<String>,
    pub consent: bool,
    pub create_time: DateTime<Utc>,
}

/// A vehicle insurance quote request in `vehicle_quote`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleQuote {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    pub lead_type: Option<String>,
    pub id_or_passport: String,
    pub consent: bool,
    pub is_discovery_client: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NewLeadRequest {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    pub consent: bool,
    pub lead_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreEventLeadRequest {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    pub is_discovery_customer: bool,
    pub has_vitality: bool,
    #[serde(default)]
    pub products: Vec<String>,
    pub consent: bool,
}

/// Vehicle quote sign-up form. `discovery_client` carries the raw radio value
/// ("yes"/"no") and is mapped to a boolean on insert.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleQuoteRequest {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    pub lead_type: Option<String>,
    pub id_number: String,
    pub consent: bool,
    pub discovery_client: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsRequest {
    pub phone_number: String,
    pub message_content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrRequest {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactCardRequest {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    pub is_discovery_customer: bool,
    pub has_vitality: bool,
    #[serde(default)]
    pub products: Vec<String>,
    pub consent: bool,
    #[serde(default = "default_phone_type")]
    pub phone_type: String,
}

fn default_phone_type() -> String {
    "iphone".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachment_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailWithDetailsRequest {
    pub to: String,
    pub subject: String,
    pub template_data: serde_json::Map<String, serde_json::Value>,
    pub attachment_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VitalityEmailRequest {
    pub to: String,
    pub name: String,
    pub discovery_customer: bool,
    pub has_vitality: bool,
    pub lead_number: String,
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Uniform success envelope for insert endpoints: `{ success: true, data: [row] }`.
#[derive(Debug, Serialize)]
pub struct InsertResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> InsertResponse<T> {
    pub fn of(row: T) -> Self {
        Self {
            success: true,
            data: vec![row],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SmsResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct EmptyLibraryResponse {
    pub success: bool,
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
pub struct MailSendResponse {
    pub success: bool,
}
