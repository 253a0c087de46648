//! Lead-Capture Funnel API Library
//!
//! This library provides the core functionality for the wellness/insurance
//! lead-capture funnel API: the Postgres lead store, external integrations
//! (BrokerEdge OTP/QR, Clickatell SMS, Microsoft Graph mail, OpenAI copy),
//! server-side funnel sessions, and the HTTP handlers.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (handler re-exports).
//! - `core`: Domain-layer namespace (validators, models, errors).
//! - `integrations`: External service clients.
//! - `broker_client`: BrokerEdge OTP/QR/decode client.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and shared state.
//! - `lead_storage`: Lead store insert operations.
//! - `mail_handlers`: Email endpoints.
//! - `models`: Rows and request/response payloads.
//! - `proxy_handlers`: BrokerEdge pass-through endpoints.
//! - `services`: Clickatell, Graph mail, and email-copy services.
//! - `session`: Server-side funnel wizard sessions.
//! - `templates`: Email template rendering and base64 assets.
//! - `validators`: SA ID, mobile, and MSISDN validators.
//! - `vcard`: vCard assembly and the on-disk card library.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod broker_client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod lead_storage;
pub mod mail_handlers;
pub mod models;
pub mod proxy_handlers;
pub mod services;
pub mod session;
pub mod templates;
pub mod validators;
pub mod vcard;
