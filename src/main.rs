mod broker_client;
mod config;
mod db;
mod errors;
mod handlers;
mod lead_storage;
mod mail_handlers;
mod models;
mod proxy_handlers;
mod services;
mod session;
mod templates;
mod validators;
mod vcard;

use axum::{
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::broker_client::BrokerEdgeClient;
use crate::config::Config;
use crate::db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Initialize database connection pool and run migrations
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Server-side funnel sessions: wizard state survives across requests and
    // expires on its own when a flow is abandoned
    let funnel_sessions = Cache::builder()
        .time_to_live(Duration::from_secs(config.session_ttl_secs))
        .max_capacity(50_000)
        .build();
    tracing::info!(
        "Funnel session cache initialized ({}s TTL)",
        config.session_ttl_secs
    );

    // BrokerEdge client for OTP issue/validate, QR generation and barcode decode
    let broker_client = BrokerEdgeClient::new(
        config.broker_edge_base_url.clone(),
        config.broker_edge_api_key.clone(),
    )?;
    tracing::info!(
        "BrokerEdge client initialized: {}",
        config.broker_edge_base_url
    );

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        db: db.pool.clone(),
        config: config.clone(),
        broker_client,
        funnel_sessions,
        vcard_lock: Mutex::new(()),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // Lead submission endpoints
        .route("/api/v1/leads", post(handlers::create_lead))
        .route("/api/v1/pre-event-leads", post(handlers::create_pre_event_lead))
        .route("/api/v1/vehicle-quotes", post(handlers::create_vehicle_quote))
        // BrokerEdge proxies (OTP / QR / barcode decode)
        .route("/api/v1/otp/send", post(proxy_handlers::send_otp))
        .route("/api/v1/otp/validate", post(proxy_handlers::validate_otp))
        .route("/api/v1/qr", post(proxy_handlers::generate_qr))
        .route("/api/v1/images/decode", post(proxy_handlers::decode_image))
        // SMS
        .route("/api/v1/sms/send", post(handlers::send_sms))
        // Contact cards
        .route("/api/v1/contact-cards", post(handlers::create_contact_card))
        .route(
            "/api/v1/contact-cards/empty",
            post(handlers::empty_vcard_library),
        )
        // Email
        .route("/api/v1/emails/send", post(mail_handlers::send_email))
        .route(
            "/api/v1/emails/send-with-details",
            post(mail_handlers::send_email_with_details),
        )
        .route(
            "/api/v1/emails/vitality",
            post(mail_handlers::send_vitality_email),
        )
        // Funnel wizard sessions
        .route(
            "/api/v1/funnel/sessions",
            post(handlers::start_funnel_session),
        )
        .route(
            "/api/v1/funnel/sessions/:token",
            get(handlers::get_funnel_session),
        )
        .route(
            "/api/v1/funnel/sessions/:token/advance",
            post(handlers::advance_funnel_session),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload (base64 images go through the decode proxy)
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting for the platform's probes
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
