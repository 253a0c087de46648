use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// Every handler returns `Result<_, AppError>`; the `IntoResponse` impl turns
/// each variant into the uniform `{ success: false, message, details? }` body
/// the funnel front-ends expect.
#[derive(Debug)]
pub enum AppError {
    /// Lead store (Postgres) errors.
    Database(sqlx::Error),
    /// Resource not found (expired funnel session, missing template).
    NotFound(String),
    /// Invalid input: missing fields, failed SA ID / mobile validation.
    BadRequest(String),
    /// An upstream service (BrokerEdge, Clickatell, Graph, OpenAI) failed.
    Upstream(String),
    /// Internal server error.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream service error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Store errors keep their message and details in the body (the wizard
    /// surfaces them in a toast); upstream and internal failures are logged at
    /// error level and reduced to a generic message.
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                let details = match e {
                    sqlx::Error::Database(db) => db.constraint().map(|c| c.to_string()),
                    _ => None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), details)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream service error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("I/O error: {}", err))
    }
}
