use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// BrokerEdge microservice (OTP issue/validate, QR generation, barcode decode).
    pub broker_edge_base_url: String,
    pub broker_edge_api_key: String,
    /// Clickatell SMS gateway.
    pub clickatell_base_url: String,
    pub clickatell_api_key: String,
    /// Azure AD client-credential flow for Graph sendMail.
    pub azure_tenant_id: String,
    pub azure_client_id: String,
    pub azure_client_secret: String,
    pub azure_authority_url: String,
    pub graph_base_url: String,
    /// Mailbox the service sends as.
    pub mail_sender: String,
    /// OpenAI chat completions for campaign email copy.
    pub openai_base_url: String,
    pub openai_api_key: String,
    pub advisor_name: String,
    /// Local directories for vCards, email templates and pre-encoded assets.
    pub vcards_dir: String,
    pub templates_dir: String,
    pub assets_dir: String,
    /// Optional brochure PDF attached to vitality confirmation emails.
    pub brochure_path: Option<String>,
    /// Funnel session lifetime in seconds.
    pub session_ttl_secs: u64,
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))
        .and_then(|v| {
            if v.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(v)
        })
}

fn required_url(name: &str) -> anyhow::Result<String> {
    required(name).and_then(|url| {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("{} must start with http:// or https://", name);
        }
        Ok(url)
    })
}

fn optional_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            broker_edge_base_url: required_url("BROKER_EDGE_BASE_URL")?,
            broker_edge_api_key: required("BROKER_EDGE_API_KEY")?,
            clickatell_base_url: optional_or(
                "CLICKATELL_BASE_URL",
                "https://platform.clickatell.com",
            ),
            clickatell_api_key: required("CLICKATELL_API_KEY")?,
            azure_tenant_id: required("AZURE_TENANT_ID")?,
            azure_client_id: required("AZURE_CLIENT_ID")?,
            azure_client_secret: required("AZURE_CLIENT_SECRET")?,
            azure_authority_url: optional_or(
                "AZURE_AUTHORITY_URL",
                "https://login.microsoftonline.com",
            ),
            graph_base_url: optional_or("GRAPH_BASE_URL", "https://graph.microsoft.com"),
            mail_sender: required("MAIL_SENDER").and_then(|sender| {
                if !sender.contains('@') {
                    anyhow::bail!("MAIL_SENDER must be an email address");
                }
                Ok(sender)
            })?,
            openai_base_url: optional_or("OPENAI_BASE_URL", "https://api.openai.com"),
            openai_api_key: required("OPENAI_API_KEY")?,
            advisor_name: optional_or("ADVISOR_NAME", "Carla Prinsloo"),
            vcards_dir: optional_or("VCARDS_DIR", "vcards"),
            templates_dir: optional_or("TEMPLATES_DIR", "templates"),
            assets_dir: optional_or("ASSETS_DIR", "assets/base64"),
            brochure_path: std::env::var("BROCHURE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SESSION_TTL_SECS must be a number of seconds"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("BrokerEdge base URL: {}", config.broker_edge_base_url);
        tracing::debug!("Clickatell base URL: {}", config.clickatell_base_url);
        tracing::debug!("Graph sender: {}", config.mail_sender);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
