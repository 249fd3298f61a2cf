use crate::config::Config;
use crate::models::ReputationReport;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Bounded wait for the reputation lookup. Expiry is terminal for the
/// request; there are no retries.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// IPQS strictness, 0-3 scale; 1 balances detection against false positives.
const STRICTNESS: &str = "1";

/// Failure talking to the reputation service. Timeouts are distinguished from
/// other transport failures because they produce different verdict reasons.
#[derive(Debug)]
pub enum ReputationError {
    /// The lookup did not complete within the bounded wait.
    Timeout,
    /// Any other transport or protocol failure, including non-2xx statuses
    /// and unparseable bodies.
    Request(String),
}

impl fmt::Display for ReputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReputationError::Timeout => write!(f, "reputation lookup timed out"),
            ReputationError::Request(msg) => write!(f, "reputation lookup failed: {}", msg),
        }
    }
}

impl std::error::Error for ReputationError {}

/// Client for the IPQualityScore IP reputation API.
///
/// One instance is built at startup and shared by reference; `reqwest::Client`
/// is internally pooled, so concurrent lookups need no locking.
pub struct IpReputationService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IpReputationService {
    /// Build the client from configuration. Returns `None` when no API key is
    /// configured, in which case the service runs degraded and the verifier
    /// fails closed.
    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        match &config.ipqs_api_key {
            Some(key) => Ok(Some(Self::with_timeout(
                config.ipqs_base_url.clone(),
                key.clone(),
                LOOKUP_TIMEOUT,
            )?)),
            None => Ok(None),
        }
    }

    /// Build a client with an explicit request timeout. Production code uses
    /// [`LOOKUP_TIMEOUT`]; tests shorten it to exercise the timeout path.
    pub fn with_timeout(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build reputation HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Look up one IP address. At most one outbound call per invocation; the
    /// caller decides what every failure means for the verdict.
    pub async fn check_ip(
        &self,
        ip_address: &str,
        user_agent: &str,
    ) -> Result<ReputationReport, ReputationError> {
        // Build URL with proper parameter encoding to prevent injection attacks
        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/api/json/ip/{}/{}",
                self.base_url, self.api_key, ip_address
            ),
            &[
                ("user_agent", user_agent),
                ("strictness", STRICTNESS),
                ("allow_public_access_points", "true"),
            ],
        )
        .map_err(|e| ReputationError::Request(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Checking IP reputation for {}", ip_address);
        // Redact key from logs to prevent credential exposure
        tracing::debug!(
            "IPQS URL: {}/api/json/ip/[REDACTED]/{}?strictness={}",
            self.base_url,
            ip_address,
            STRICTNESS
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ReputationError::Timeout
            } else {
                ReputationError::Request(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("IPQS returned error {}: {}", status, error_text);
            return Err(ReputationError::Request(format!(
                "IPQS returned status {}: {}",
                status, error_text
            )));
        }

        let report: ReputationReport = response.json().await.map_err(|e| {
            ReputationError::Request(format!("Failed to parse IPQS response: {}", e))
        })?;

        tracing::debug!(
            "IPQS report for {}: success={} proxy={} vpn={} tor={} country={:?} region={:?} fraud_score={:?}",
            ip_address,
            report.success,
            report.proxy,
            report.vpn,
            report.tor,
            report.country_code,
            report.region,
            report.fraud_score
        );

        Ok(report)
    }
}
