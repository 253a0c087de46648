use crate::config::Config;
use crate::errors::AppError;
use crate::validators::normalize_sa_msisdn;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// Clickatell SMS gateway
// ---------------------------------------------------------------------------

/// Outcome of an SMS send. Gateway rejections keep the upstream status so the
/// handler can propagate it instead of collapsing everything into a 502.
#[derive(Debug)]
pub enum SmsDelivery {
    Sent(Value),
    Rejected { status: u16, message: String },
}

pub struct SmsService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SmsService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.clickatell_base_url.clone(),
            api_key: config.clickatell_api_key.clone(),
        }
    }

    /// Normalize the number to international SA form and send one SMS.
    pub async fn send(&self, phone_number: &str, content: &str) -> Result<SmsDelivery, AppError> {
        let to = normalize_sa_msisdn(phone_number);
        let url = format!("{}/v1/message", self.base_url);

        let payload = json!({
            "messages": [
                {
                    "channel": "sms",
                    "to": to,
                    "content": content,
                }
            ]
        });

        tracing::info!("Sending SMS to {}", to);

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Clickatell request failed: {}", e)))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or_else(|_| json!({}));

        if status.is_success() {
            tracing::info!("SMS delivered to gateway for {}", to);
            Ok(SmsDelivery::Sent(body))
        } else {
            let message = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Failed to send SMS.")
                .to_string();
            tracing::warn!("Clickatell rejected SMS ({}): {}", status, message);
            Ok(SmsDelivery::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Microsoft Graph mail
// ---------------------------------------------------------------------------

/// Outgoing message for Graph `sendMail`. HTML wins over text when both are
/// present; a missing attachment file is skipped with a warning.
#[derive(Debug, Clone, Default)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub attachment_path: Option<String>,
}

pub struct GraphMailService {
    client: Client,
    authority_url: String,
    graph_base_url: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    sender: String,
}

impl GraphMailService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            authority_url: config.azure_authority_url.clone(),
            graph_base_url: config.graph_base_url.clone(),
            tenant_id: config.azure_tenant_id.clone(),
            client_id: config.azure_client_id.clone(),
            client_secret: config.azure_client_secret.clone(),
            sender: config.mail_sender.clone(),
        }
    }

    /// Acquire a client-credential token for the Graph default scope.
    async fn acquire_token(&self) -> Result<String, AppError> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url, self.tenant_id
        );

        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", "https://graph.microsoft.com/.default"),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Graph token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream(format!(
                "Graph token endpoint returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse Graph token response: {}", e))
        })?;

        body.get("access_token")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| AppError::Upstream("Could not acquire Graph token".to_string()))
    }

    /// Send one message as the configured service mailbox.
    pub async fn send_mail(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let token = self.acquire_token().await?;

        let (content_type, content) = match (&email.html, &email.text) {
            (Some(html), _) => ("HTML", html.clone()),
            (None, Some(text)) => ("Text", text.clone()),
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Email requires html or text content".to_string(),
                ))
            }
        };

        let mut message = json!({
            "subject": email.subject,
            "body": {
                "contentType": content_type,
                "content": content,
            },
            "toRecipients": [
                { "emailAddress": { "address": email.to } }
            ],
        });

        if let Some(ref path) = email.attachment_path {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let name = Path::new(path)
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("attachment")
                        .to_string();
                    message["attachments"] = json!([{
                        "@odata.type": "#microsoft.graph.fileAttachment",
                        "name": name,
                        "contentBytes": BASE64.encode(&bytes),
                    }]);
                }
                Err(e) => {
                    tracing::warn!("Skipping missing attachment {}: {}", path, e);
                }
            }
        }

        let payload = json!({
            "message": message,
            "saveToSentItems": true,
        });

        let url = format!(
            "{}/v1.0/users/{}/sendMail",
            self.graph_base_url, self.sender
        );
        tracing::info!("Sending mail to {} via Graph", email.to);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Graph sendMail request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream(format!(
                "Graph sendMail failed {}: {}",
                status, error_text
            )));
        }

        tracing::info!("Mail sent to {}", email.to);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AI-generated campaign email copy
// ---------------------------------------------------------------------------

/// Short advisor profile fed to the prompt so the generated copy can
/// introduce the campaign's financial advisor.
const ADVISOR_PROFILE: &str = "A certified Discovery financial advisor with over a decade of \
experience in wellness-linked insurance, retirement planning, and the Vitality rewards \
programme. Known for a personal, practical approach to helping clients align their health \
and financial goals.";

/// Subject line for the wellness-day confirmation email.
pub fn vitality_subject(name: &str, has_vitality: bool) -> String {
    if has_vitality {
        format!(
            "{}, Your Confirmation for the Vitality Wellness Day Event!",
            name
        )
    } else {
        format!("{}, Discover Vitality and Join Our Wellness Day Event!", name)
    }
}

/// Build the copywriting prompt for a registrant.
///
/// The scenario block depends on the (discovery customer, vitality member)
/// pair: full member, customer without Vitality, or non-customer.
pub fn build_vitality_prompt(
    name: &str,
    lead_number: &str,
    discovery_customer: bool,
    has_vitality: bool,
    advisor_name: &str,
) -> String {
    let advisor_inline = format!(
        "<strong style=\"color: #eb2660;\">{}</strong>",
        advisor_name
    );

    let scenario = if discovery_customer && has_vitality {
        format!(
            "SCENARIO:\n\
             * Thank them for registering\n\
             * Mention reference number: <strong>{lead_number}</strong>\n\
             * Acknowledge they are fully eligible and can earn points through participation\n\
             * Invite them to attend the Wellness Day\n\
             * Mention that {advisor_inline} is available to help enhance their wellness and financial strategy"
        )
    } else if discovery_customer {
        format!(
            "SCENARIO:\n\
             * Thank them for registering\n\
             * Acknowledge they are a Discovery customer but not yet a Vitality member\n\
             * Encourage them to activate Vitality to unlock lifestyle rewards\n\
             * Mention a few benefits (example: gym, healthy food, flights)\n\
             * Invite them to attend the Wellness Day\n\
             * Recommend connecting with {advisor_inline} for onboarding"
        )
    } else {
        format!(
            "SCENARIO:\n\
             * Thank them for registering\n\
             * Mention they are not a Discovery customer yet\n\
             * Invite them to join Discovery first, then activate Vitality\n\
             * Mention top lifestyle benefits\n\
             * Encourage reaching out to {advisor_inline} for assistance\n\
             * Reinforce participation in the upcoming Wellness Day"
        )
    };

    format!(
        "You are a content marketing specialist writing HTML body content for Discovery \
         Vitality Wellness Day email campaigns.\n\n\
         You will generate a short and friendly email message in basic HTML format (using \
         only <p>, <strong>, <ul>, and <a> tags) that gets inserted into a styled email \
         template. Do not add styles, headers, or layout.\n\n\
         PARAMETERS:\n\
         * Name: {name}\n\
         * Registration reference number: {lead_number}\n\
         * Discovery customer: {discovery_customer}\n\
         * Vitality member: {has_vitality}\n\
         * Advisor profile: {advisor_profile}\n\n\
         OBJECTIVE:\n\
         Write a personalized thank-you message to users who registered for an upcoming \
         Vitality Wellness Day organized by Discovery's financial advisor, {advisor_name}. \
         Thank them for registering, encourage Discovery and Vitality activation where \
         applicable, briefly highlight 2-4 core benefits, introduce {advisor_name} as their \
         potential financial advisor, and end with a warm sign-off from {advisor_name} and \
         the Discovery Vitality team.\n\n\
         {scenario}\n\n\
         DO NOT:\n\
         * Include any <html>, <head>, or <style> tags\n\
         * Add your own layout elements\n\
         * Add new lines around the advisor's name; keep it inline\n\n\
         Advisor name format (use inline): {advisor_inline}\n\n\
         TONE & FORMAT:\n\
         * Professional and friendly\n\
         * Keep it short: 4-6 sentences max\n\
         * HTML content only\n\
         * Return only what goes inside the body placeholder",
        advisor_profile = ADVISOR_PROFILE,
    )
}

pub struct EmailCopyService {
    client: Client,
    base_url: String,
    api_key: String,
    advisor_name: String,
}

impl EmailCopyService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            advisor_name: config.advisor_name.clone(),
        }
    }

    /// Generate the personalized HTML body for a wellness-day confirmation.
    pub async fn generate_vitality_copy(
        &self,
        name: &str,
        lead_number: &str,
        discovery_customer: bool,
        has_vitality: bool,
    ) -> Result<String, AppError> {
        let prompt = build_vitality_prompt(
            name,
            lead_number,
            discovery_customer,
            has_vitality,
            &self.advisor_name,
        );

        let payload = json!({
            "model": "gpt-4",
            "messages": [
                {
                    "role": "system",
                    "content": "You are a content marketing specialist writing vibrant, on-brand emails for Discovery Vitality.",
                },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.7,
        });

        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::info!("Generating vitality email copy for lead {}", lead_number);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Copy generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream(format!(
                "Copy generation returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse copy generation response: {}", e))
        })?;

        let copy = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if copy.is_empty() {
            return Err(AppError::Upstream(
                "AI generation error: empty email body".to_string(),
            ));
        }

        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_branches_on_vitality_membership() {
        assert_eq!(
            vitality_subject("Thandi", true),
            "Thandi, Your Confirmation for the Vitality Wellness Day Event!"
        );
        assert_eq!(
            vitality_subject("Thandi", false),
            "Thandi, Discover Vitality and Join Our Wellness Day Event!"
        );
    }

    #[test]
    fn prompt_full_member_mentions_reference_number() {
        let prompt = build_vitality_prompt("Sipho", "WD-000042", true, true, "Carla Prinsloo");
        assert!(prompt.contains("<strong>WD-000042</strong>"));
        assert!(prompt.contains("fully eligible"));
        assert!(prompt.contains("<strong style=\"color: #eb2660;\">Carla Prinsloo</strong>"));
    }

    #[test]
    fn prompt_customer_without_vitality_pushes_activation() {
        let prompt = build_vitality_prompt("Sipho", "WD-000042", true, false, "Carla Prinsloo");
        assert!(prompt.contains("not yet a Vitality member"));
        assert!(prompt.contains("activate Vitality"));
    }

    #[test]
    fn prompt_non_customer_invites_joining() {
        let prompt = build_vitality_prompt("Sipho", "WD-000042", false, false, "Carla Prinsloo");
        assert!(prompt.contains("not a Discovery customer yet"));
        assert!(prompt.contains("join Discovery first"));
    }
}
