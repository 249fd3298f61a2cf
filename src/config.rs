use serde::Deserialize;

/// Placeholder value shipped in .env templates; treated the same as a missing key.
const IPQS_PLACEHOLDER_KEY: &str = "YOUR_IPQUALITYSCORE_API_KEY";

const DEFAULT_IPQS_BASE_URL: &str = "https://www.ipqualityscore.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// IPQualityScore API key. `None` means the reputation service is not
    /// configured and every IP-dependent check fails closed.
    pub ipqs_api_key: Option<String>,
    pub ipqs_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let ipqs_base_url =
            std::env::var("IPQS_BASE_URL").unwrap_or_else(|_| DEFAULT_IPQS_BASE_URL.to_string());
        if ipqs_base_url.trim().is_empty() {
            anyhow::bail!("IPQS_BASE_URL cannot be empty");
        }
        if !ipqs_base_url.starts_with("http://") && !ipqs_base_url.starts_with("https://") {
            anyhow::bail!("IPQS_BASE_URL must start with http:// or https://");
        }

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            ipqs_api_key: std::env::var("IPQS_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty() && key != IPQS_PLACEHOLDER_KEY),
            ipqs_base_url,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("IPQS Base URL: {}", config.ipqs_base_url);
        tracing::debug!("Server Port: {}", config.port);
        if config.ipqs_api_key.is_none() {
            tracing::warn!(
                "IPQS_API_KEY not configured; IP reputation checks fail closed and every lead will be rejected"
            );
        }

        Ok(config)
    }
}
