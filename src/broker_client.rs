use crate::errors::AppError;
use serde_json::json;
use std::time::Duration;

/// Response forwarded back from the BrokerEdge microservice.
///
/// The OTP endpoints keep their verification state in an upstream session
/// cookie, so the raw body, status, and any `Set-Cookie` header are carried
/// through untouched.
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: u16,
    pub body: String,
    pub set_cookie: Option<String>,
}

/// Client for the BrokerEdge microservice hosting the OTP issue/validate,
/// text-to-QR, and base64-image barcode decode endpoints.
#[derive(Clone)]
pub struct BrokerEdgeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BrokerEdgeClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::Upstream(format!("Failed to create BrokerEdge client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Forward a JSON body verbatim to an upstream path, attaching the
    /// configured API key and, when present, the caller's session cookie.
    /// Upstream status and body pass through as-is.
    async fn forward(
        &self,
        path: &str,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> Result<ProxiedResponse, AppError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::info!("Forwarding request to BrokerEdge: {}", path);

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(body);

        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }

        let response = request.send().await.map_err(|e| {
            AppError::Upstream(format!("BrokerEdge request to {} failed: {}", path, e))
        })?;

        let status = response.status().as_u16();
        let set_cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.text().await.map_err(|e| {
            AppError::Upstream(format!("Failed to read BrokerEdge response: {}", e))
        })?;

        tracing::debug!("BrokerEdge {} responded with status {}", path, status);
        Ok(ProxiedResponse {
            status,
            body,
            set_cookie,
        })
    }

    /// Issue an OTP to the mobile number in the body. The upstream session
    /// cookie in the response must reach the browser for validation to work.
    pub async fn send_otp(&self, body: &serde_json::Value) -> Result<ProxiedResponse, AppError> {
        self.forward("/send_otp_clean", body, None).await
    }

    /// Validate a submitted OTP, forwarding the browser's session cookie.
    pub async fn validate_otp(
        &self,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> Result<ProxiedResponse, AppError> {
        self.forward("/validate_otp_clean", body, cookie).await
    }

    /// Decode a barcode from a base64-encoded image.
    pub async fn decode_image(
        &self,
        body: &serde_json::Value,
        cookie: Option<&str>,
    ) -> Result<ProxiedResponse, AppError> {
        self.forward("/load_base_64_disc", body, cookie).await
    }

    /// Render text as a QR code.
    pub async fn generate_qr(&self, text: &str) -> Result<ProxiedResponse, AppError> {
        self.forward("/string_to_qr", &json!({ "text": text }), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BrokerEdgeClient::new("https://example.com".to_string(), "key".to_string());
        assert!(client.is_ok());
    }
}
