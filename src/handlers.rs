use crate::models::{LeadSubmission, LeadVerdict};
use crate::reputation::IpReputationService;
use crate::verifier;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Read-only after startup; requests share it by `Arc` with no locking.
pub struct AppState {
    /// Reputation lookup client. `None` when no API key is configured, in
    /// which case verification fails closed (degraded mode).
    pub reputation: Option<IpReputationService>,
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-verify-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/leads/verify
///
/// Runs the verification pipeline for one lead submission. Always answers
/// 200 with a verdict; policy failures, lookup failures, and a missing
/// credential all surface as `is_genuine=false` with a reason. The only
/// non-2xx outcome is a malformed body, rejected by the `Json` extractor
/// before this handler runs.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `addr` - The socket peer address (fallback when no forwarded header).
/// * `headers` - Request headers, consulted for the forwarded client IP.
/// * `lead` - JSON body with the lead submission.
pub async fn verify_lead(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(lead): Json<LeadSubmission>,
) -> Json<LeadVerdict> {
    let client_ip = extract_client_ip(&headers, addr);
    tracing::info!(
        "POST /api/v1/leads/verify - ip: {:?}, state: {:?}, time_on_page: {}s",
        client_ip,
        lead.submitted_state,
        lead.time_on_page
    );

    let verdict = verifier::verify_lead(
        &lead,
        client_ip.as_deref(),
        state.reputation.as_ref(),
    )
    .await;

    if verdict.is_genuine {
        tracing::info!("Lead from {:?} accepted", client_ip);
    } else {
        tracing::info!(
            "Lead from {:?} rejected: {}",
            client_ip,
            verdict.reason.as_deref().unwrap_or("unspecified")
        );
    }

    Json(verdict)
}

/// Derive the client IP: first valid entry of `X-Forwarded-For`, then
/// `X-Real-IP`, then the socket peer address.
///
/// Header values that do not parse as an IP are ignored rather than trusted,
/// so a garbage forwarded header falls back to the peer address.
fn extract_client_ip(headers: &HeaderMap, addr: SocketAddr) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded
            .split(',')
            .map(str::trim)
            .find_map(|s| s.parse::<IpAddr>().ok())
        {
            return Some(ip.to_string());
        }
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return Some(ip.to_string());
    }

    Some(addr.ip().to_string())
}
