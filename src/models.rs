use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lead submission posted by the form pipeline.
///
/// The client IP is not part of the body; it is derived from the connection
/// and forwarded headers by the handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeadSubmission {
    /// The U.S. state the user claims to be from (e.g. "California" or "CA").
    pub submitted_state: String,
    /// Seconds spent on the page before submitting, reported by the
    /// frontend lead-filter script.
    pub time_on_page: u64,
    /// Browser user agent string, forwarded to the reputation lookup.
    pub user_agent: String,
}

/// Verdict returned for every verification request.
///
/// Policy failures are not errors: the endpoint always answers 200 with
/// `is_genuine=false` and a reason.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LeadVerdict {
    pub is_genuine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl LeadVerdict {
    pub fn genuine(reason: impl Into<String>, details: Value) -> Self {
        Self {
            is_genuine: true,
            reason: Some(reason.into()),
            details: Some(details),
        }
    }

    pub fn rejected(reason: impl Into<String>, details: Value) -> Self {
        Self {
            is_genuine: false,
            reason: Some(reason.into()),
            details: Some(details),
        }
    }
}

/// IPQualityScore response body.
///
/// The upstream payload is loosely typed and fields come and go between plan
/// tiers, so everything defaults: absent flags read as `false`, absent
/// strings/numbers as `None`. Anything we don't model lands in `raw`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReputationReport {
    #[serde(default)]
    pub success: bool,

    /// Error description when `success` is false.
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub proxy: bool,

    #[serde(default)]
    pub vpn: bool,

    #[serde(default)]
    pub tor: bool,

    /// Two-letter country code (e.g. "US").
    #[serde(default)]
    pub country_code: Option<String>,

    /// Free-text state/region name for the IP geolocation.
    #[serde(default)]
    pub region: Option<String>,

    /// 0-100 risk score.
    #[serde(default)]
    pub fraud_score: Option<f64>,

    /// Raw data for any additional fields
    #[serde(flatten)]
    pub raw: Value,
}
