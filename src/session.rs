//! Server-side funnel sessions.
//!
//! The sign-up wizard spans several requests (sign-up, OTP verification, lead
//! creation, thank-you) that can be abandoned at any point. Instead of the
//! browser carrying partially-validated form state, the server issues a
//! session token at sign-up and keeps the state in a TTL cache; abandoned
//! flows simply expire.

use crate::errors::AppError;
use crate::validators::is_valid_sa_mobile;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wizard steps, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStep {
    AwaitingOtp,
    Verified,
    LeadCreated,
    Completed,
}

impl FunnelStep {
    /// Steps only ever move forward one at a time; skipping OTP verification
    /// or re-submitting a completed flow is rejected.
    pub fn can_advance_to(self, next: FunnelStep) -> bool {
        matches!(
            (self, next),
            (FunnelStep::AwaitingOtp, FunnelStep::Verified)
                | (FunnelStep::Verified, FunnelStep::LeadCreated)
                | (FunnelStep::LeadCreated, FunnelStep::Completed)
        )
    }
}

/// State carried across the wizard for one registrant.
#[derive(Debug, Clone, Serialize)]
pub struct FunnelSession {
    pub token: String,
    pub step: FunnelStep,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
    /// Reference number, present once the lead row exists.
    pub lead_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub type FunnelSessionCache = Cache<String, FunnelSession>;

#[derive(Debug, Clone, Deserialize)]
pub struct StartFunnelRequest {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub mobile: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceFunnelRequest {
    pub step: FunnelStep,
    pub lead_code: Option<String>,
}

/// Validate the sign-up fields and open a new session at `AwaitingOtp`.
pub async fn start_session(
    cache: &FunnelSessionCache,
    req: &StartFunnelRequest,
) -> Result<FunnelSession, AppError> {
    if req.name.trim().is_empty() || req.surname.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and surname are required".to_string(),
        ));
    }
    if !is_valid_sa_mobile(&req.mobile) {
        return Err(AppError::BadRequest(
            "Please enter a valid South African mobile number (e.g. 0712345678).".to_string(),
        ));
    }

    let session = FunnelSession {
        token: Uuid::new_v4().to_string(),
        step: FunnelStep::AwaitingOtp,
        name: req.name.clone(),
        surname: req.surname.clone(),
        email: req.email.clone(),
        mobile: req.mobile.clone(),
        lead_code: None,
        created_at: Utc::now(),
    };

    cache.insert(session.token.clone(), session.clone()).await;
    tracing::info!("Opened funnel session {} for {}", session.token, session.mobile);
    Ok(session)
}

/// Fetch a session; expired or unknown tokens are a 404.
pub async fn fetch_session(
    cache: &FunnelSessionCache,
    token: &str,
) -> Result<FunnelSession, AppError> {
    cache.get(token).await.ok_or_else(|| {
        AppError::NotFound("Funnel session not found or expired".to_string())
    })
}

/// Advance a session one step, carrying the lead code once the lead exists.
pub async fn advance_session(
    cache: &FunnelSessionCache,
    token: &str,
    req: &AdvanceFunnelRequest,
) -> Result<FunnelSession, AppError> {
    let mut session = fetch_session(cache, token).await?;

    if !session.step.can_advance_to(req.step) {
        return Err(AppError::BadRequest(format!(
            "Cannot advance funnel from {:?} to {:?}",
            session.step, req.step
        )));
    }

    session.step = req.step;
    if req.step == FunnelStep::LeadCreated {
        session.lead_code = req.lead_code.clone();
    }

    cache.insert(token.to_string(), session.clone()).await;
    tracing::info!("Funnel session {} advanced to {:?}", token, session.step);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_cache() -> FunnelSessionCache {
        Cache::builder()
            .time_to_live(Duration::from_secs(60))
            .max_capacity(100)
            .build()
    }

    fn signup() -> StartFunnelRequest {
        StartFunnelRequest {
            name: "Thandi".to_string(),
            surname: "Mokoena".to_string(),
            email: Some("thandi@example.com".to_string()),
            mobile: "0823292438".to_string(),
        }
    }

    #[test]
    fn steps_only_move_forward_one_at_a_time() {
        assert!(FunnelStep::AwaitingOtp.can_advance_to(FunnelStep::Verified));
        assert!(FunnelStep::Verified.can_advance_to(FunnelStep::LeadCreated));
        assert!(FunnelStep::LeadCreated.can_advance_to(FunnelStep::Completed));

        assert!(!FunnelStep::AwaitingOtp.can_advance_to(FunnelStep::LeadCreated));
        assert!(!FunnelStep::AwaitingOtp.can_advance_to(FunnelStep::Completed));
        assert!(!FunnelStep::Verified.can_advance_to(FunnelStep::AwaitingOtp));
        assert!(!FunnelStep::Completed.can_advance_to(FunnelStep::AwaitingOtp));
        assert!(!FunnelStep::Verified.can_advance_to(FunnelStep::Verified));
    }

    #[tokio::test]
    async fn full_wizard_flow() {
        let cache = test_cache();
        let session = start_session(&cache, &signup()).await.unwrap();
        assert_eq!(session.step, FunnelStep::AwaitingOtp);
        assert!(session.lead_code.is_none());

        let session = advance_session(
            &cache,
            &session.token,
            &AdvanceFunnelRequest {
                step: FunnelStep::Verified,
                lead_code: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(session.step, FunnelStep::Verified);

        let session = advance_session(
            &cache,
            &session.token,
            &AdvanceFunnelRequest {
                step: FunnelStep::LeadCreated,
                lead_code: Some("WD-000042".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(session.lead_code.as_deref(), Some("WD-000042"));

        let session = advance_session(
            &cache,
            &session.token,
            &AdvanceFunnelRequest {
                step: FunnelStep::Completed,
                lead_code: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(session.step, FunnelStep::Completed);
        // Lead code survives the final step
        assert_eq!(session.lead_code.as_deref(), Some("WD-000042"));
    }

    #[tokio::test]
    async fn skipping_otp_verification_is_rejected() {
        let cache = test_cache();
        let session = start_session(&cache, &signup()).await.unwrap();

        let result = advance_session(
            &cache,
            &session.token,
            &AdvanceFunnelRequest {
                step: FunnelStep::LeadCreated,
                lead_code: Some("WD-000001".to_string()),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        // The session itself is untouched
        let unchanged = fetch_session(&cache, &session.token).await.unwrap();
        assert_eq!(unchanged.step, FunnelStep::AwaitingOtp);
    }

    #[tokio::test]
    async fn invalid_mobile_is_rejected_at_signup() {
        let cache = test_cache();
        let mut req = signup();
        req.mobile = "12345".to_string();
        assert!(matches!(
            start_session(&cache, &req).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let cache = test_cache();
        assert!(matches!(
            fetch_session(&cache, "nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}
