//! Email endpoints: raw Graph sends, templated campaign mail, and the
//! AI-personalized wellness-day confirmation.

use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::{
    MailSendResponse, SendEmailRequest, SendEmailWithDetailsRequest, VitalityEmailRequest,
};
use crate::services::{vitality_subject, EmailCopyService, GraphMailService, OutgoingEmail};
use crate::templates::{load_base64_assets, load_template, render_template, EMAIL_DISCLAIMER};
use axum::{extract::State, Json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// POST /api/v1/emails/send
///
/// Sends a message as the service mailbox, with an optional file attachment.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<MailSendResponse>, AppError> {
    if req.to.trim().is_empty() || req.subject.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Recipient and subject are required".to_string(),
        ));
    }

    let mail = GraphMailService::new(&state.config);
    mail.send_mail(&OutgoingEmail {
        to: req.to,
        subject: req.subject,
        html: req.html,
        text: req.text,
        attachment_path: req.attachment_path,
    })
    .await?;

    Ok(Json(MailSendResponse { success: true }))
}

/// POST /api/v1/emails/send-with-details
///
/// Renders the generic campaign template with the caller's `template_data`
/// (plus the standard disclaimer) and sends the result.
pub async fn send_email_with_details(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendEmailWithDetailsRequest>,
) -> Result<Json<MailSendResponse>, AppError> {
    if req.to.trim().is_empty() || req.subject.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Recipient and subject are required".to_string(),
        ));
    }

    let template = load_template(&state.config.templates_dir, "email-template.html").await?;

    let mut values: BTreeMap<String, String> = req
        .template_data
        .iter()
        .map(|(key, value)| {
            let rendered = match value.as_str() {
                Some(s) => s.to_string(),
                None => value.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect();
    values.insert("disclaimer".to_string(), EMAIL_DISCLAIMER.to_string());

    let html = render_template(&template, &values)?;

    let mail = GraphMailService::new(&state.config);
    mail.send_mail(&OutgoingEmail {
        to: req.to,
        subject: req.subject,
        html: Some(html),
        attachment_path: req.attachment_path,
        ..Default::default()
    })
    .await?;

    Ok(Json(MailSendResponse { success: true }))
}

/// POST /api/v1/emails/vitality
///
/// Wellness-day confirmation: the subject depends on Vitality membership, the
/// body copy is AI-generated from the registrant's scenario, and the brochure
/// is attached when configured.
pub async fn send_vitality_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VitalityEmailRequest>,
) -> Result<Json<MailSendResponse>, AppError> {
    if req.to.trim().is_empty() || req.name.trim().is_empty() || req.lead_number.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Missing required fields: to, name, or lead_number".to_string(),
        ));
    }

    let subject = vitality_subject(&req.name, req.has_vitality);

    let copy = EmailCopyService::new(&state.config)
        .generate_vitality_copy(
            &req.name,
            &req.lead_number,
            req.discovery_customer,
            req.has_vitality,
        )
        .await?;

    let template =
        load_template(&state.config.templates_dir, "vitality-email-template.html").await?;

    let mut values = load_base64_assets(&state.config.assets_dir).await?;
    values.insert("header".to_string(), subject.clone());
    values.insert("body".to_string(), copy);
    values.insert("disclaimer".to_string(), EMAIL_DISCLAIMER.to_string());

    let html = render_template(&template, &values)?;

    // The brochure is part of the campaign; a configured-but-missing file is
    // a deployment error, not something to silently skip.
    let attachment_path = match state.config.brochure_path {
        Some(ref path) => {
            if tokio::fs::metadata(path).await.is_err() {
                return Err(AppError::Internal(format!(
                    "Attachment not found at {}",
                    path
                )));
            }
            Some(path.clone())
        }
        None => None,
    };

    let mail = GraphMailService::new(&state.config);
    mail.send_mail(&OutgoingEmail {
        to: req.to,
        subject,
        html: Some(html),
        attachment_path,
        ..Default::default()
    })
    .await?;

    Ok(Json(MailSendResponse { success: true }))
}
