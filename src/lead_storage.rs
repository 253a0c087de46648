use crate::errors::AppError;
use crate::models::{
    Lead, NewLeadRequest, PreEventLead, PreEventLeadRequest, VehicleQuote, VehicleQuoteRequest,
};
use sqlx::PgPool;

/// Storage service for captured leads.
///
/// Every write is a single insert returning the stored row; there is no
/// update or delete lifecycle for lead data in this service.
pub struct LeadStorage {
    pool: PgPool,
}

impl LeadStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a plain campaign lead and return the stored row.
    pub async fn insert_lead(&self, req: &NewLeadRequest) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (name, surname, email, mobile, consent, lead_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, surname, email, mobile, consent, lead_type, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.surname)
        .bind(&req.email)
        .bind(&req.mobile)
        .bind(req.consent)
        .bind(&req.lead_type)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Stored lead {} for {}", lead.id, lead.mobile);
        Ok(lead)
    }

    /// Insert a pre-event registration. The store assigns `lead_id` and the
    /// `lead_code` reference number quoted back to the registrant.
    pub async fn insert_pre_event_lead(
        &self,
        req: &PreEventLeadRequest,
    ) -> Result<PreEventLead, AppError> {
        let lead = sqlx::query_as::<_, PreEventLead>(
            r#"
            INSERT INTO pre_reg_lead
                (name, surname, email, mobile, is_discovery_customer, has_vitality, products, consent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING lead_id, lead_code, name, surname, email, mobile,
                      is_discovery_customer, has_vitality, products, consent, create_time
            "#,
        )
        .bind(&req.name)
        .bind(&req.surname)
        .bind(&req.email)
        .bind(&req.mobile)
        .bind(req.is_discovery_customer)
        .bind(req.has_vitality)
        .bind(&req.products)
        .bind(req.consent)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Stored pre-event lead {} ({})",
            lead.lead_id,
            lead.lead_code
        );
        Ok(lead)
    }

    /// Insert a vehicle quote request. The form's "yes"/"no" radio value is
    /// mapped to `is_discovery_client` here.
    pub async fn insert_vehicle_quote(
        &self,
        req: &VehicleQuoteRequest,
    ) -> Result<VehicleQuote, AppError> {
        let is_discovery_client = req.discovery_client.as_deref() == Some("yes");

        let quote = sqlx::query_as::<_, VehicleQuote>(
            r#"
            INSERT INTO vehicle_quote
                (name, surname, email, mobile, lead_type, id_or_passport, consent, is_discovery_client)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, surname, email, mobile, lead_type, id_or_passport,
                      consent, is_discovery_client, created_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.surname)
        .bind(&req.email)
        .bind(&req.mobile)
        .bind(&req.lead_type)
        .bind(&req.id_number)
        .bind(req.consent)
        .bind(is_discovery_client)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Stored vehicle quote {} for {}", quote.id, quote.mobile);
        Ok(quote)
    }
}
