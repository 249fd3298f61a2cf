//! Lead verification pipeline.
//!
//! A fixed sequence of checks, short-circuiting on the first failure:
//! 1. Client IP presence.
//! 2. Time on page (must exceed [`MIN_TIME_ON_PAGE_SECS`]).
//! 3. Reputation service configured (fail closed when it is not).
//! 4. Remote reputation lookup (timeout and transport errors are terminal).
//! 5. Proxy/VPN/Tor flags.
//! 6. Country code must be US.
//! 7. Submitted state must be a valid U.S. state.
//! 8. IP geolocation state must match the submitted state.
//!
//! Every failure is a normal negative verdict, never a server error. The
//! verdict is a pure function of the submission, the lookup result, and the
//! configured credential; nothing is shared or mutated across requests.

use crate::models::{LeadSubmission, LeadVerdict, ReputationReport};
use crate::reputation::{IpReputationService, ReputationError};
use crate::states::normalize_state;
use serde_json::json;

/// Leads must spend strictly more than this many seconds on the page.
/// Policy constant, not request-configurable.
pub const MIN_TIME_ON_PAGE_SECS: u64 = 2;

/// Run the full verification pipeline for one lead.
///
/// `client_ip` is the address derived from the connection; `reputation` is
/// `None` when no API key is configured, which rejects the lead at step 3.
/// Performs at most one outbound call, with no retries.
pub async fn verify_lead(
    lead: &LeadSubmission,
    client_ip: Option<&str>,
    reputation: Option<&IpReputationService>,
) -> LeadVerdict {
    let client_ip = match client_ip {
        Some(ip) if !ip.trim().is_empty() => ip,
        _ => {
            return LeadVerdict {
                is_genuine: false,
                reason: Some("Could not determine client IP address.".to_string()),
                details: None,
            };
        }
    };

    tracing::info!(
        "Verifying lead: ip={} time_on_page={}s submitted_state={:?}",
        client_ip,
        lead.time_on_page,
        lead.submitted_state
    );

    // 1. Time on page check (must be greater than 2 seconds)
    if lead.time_on_page <= MIN_TIME_ON_PAGE_SECS {
        return LeadVerdict::rejected(
            "Low time on page.",
            json!({
                "time_on_page": lead.time_on_page,
                "requirement": format!("> {} seconds", MIN_TIME_ON_PAGE_SECS),
            }),
        );
    }

    // 2. Reputation service availability. IP checks are mandatory, so a
    // missing credential rejects rather than skipping ahead to genuine.
    let Some(reputation) = reputation else {
        tracing::warn!(
            "IPQS API key not configured; rejecting lead from {} without IP checks",
            client_ip
        );
        return LeadVerdict::rejected(
            "IP validation service not configured (API key missing). Cannot verify IP-related criteria.",
            json!({ "client_ip": client_ip }),
        );
    };

    // 3. Single reputation lookup; timeout and transport errors are terminal
    let report = match reputation.check_ip(client_ip, &lead.user_agent).await {
        Ok(report) => report,
        Err(ReputationError::Timeout) => {
            tracing::warn!("IPQS lookup timed out for {}", client_ip);
            return LeadVerdict::rejected(
                "IP validation service timed out.",
                json!({ "client_ip": client_ip }),
            );
        }
        Err(ReputationError::Request(error)) => {
            tracing::error!("IPQS lookup failed for {}: {}", client_ip, error);
            return LeadVerdict::rejected(
                "IP validation service request exception.",
                json!({ "client_ip": client_ip, "error": error }),
            );
        }
    };

    if !report.success {
        let message = report
            .message
            .as_deref()
            .unwrap_or("Unknown error from IPQualityScore");
        tracing::warn!("IPQS reported failure for {}: {}", client_ip, message);
        return LeadVerdict::rejected(
            format!("IP validation failed: {}", message),
            json!({ "client_ip": client_ip, "ipqs_response": report }),
        );
    }

    assess_report(lead, client_ip, &report)
}

/// Checks 5-8 plus the passing verdict, evaluated against an
/// already-fetched report. Pure and synchronous.
pub fn assess_report(
    lead: &LeadSubmission,
    client_ip: &str,
    report: &ReputationReport,
) -> LeadVerdict {
    // 4. No proxy/VPN/Tor may be detected
    if report.proxy || report.vpn || report.tor {
        let mut detected = Vec::new();
        if report.proxy {
            detected.push("proxy");
        }
        if report.vpn {
            detected.push("vpn");
        }
        if report.tor {
            detected.push("tor");
        }
        return LeadVerdict::rejected(
            format!("{} detected.", capitalize_first(&detected.join(", "))),
            json!({
                "client_ip": client_ip,
                "proxy": report.proxy,
                "vpn": report.vpn,
                "tor": report.tor,
                "fraud_score": report.fraud_score,
            }),
        );
    }

    // 5. Geolocation must be a U.S. address; an absent country code fails too
    if report.country_code.as_deref() != Some("US") {
        return LeadVerdict::rejected(
            "IP address is not from the U.S.",
            json!({
                "client_ip": client_ip,
                "ip_country": report.country_code,
                "ip_state": report.region,
                "submitted_state": lead.submitted_state,
            }),
        );
    }

    // 6. The submitted state itself must be recognizable
    let Some(normalized_submitted) = normalize_state(&lead.submitted_state) else {
        return LeadVerdict::rejected(
            "Submitted state is not a valid U.S. state name or abbreviation.",
            json!({
                "client_ip": client_ip,
                "submitted_state_raw": lead.submitted_state,
                "ip_state_raw": report.region,
            }),
        );
    };

    // 7. IP geolocation state must match. An absent or unrecognized region
    // fails the comparison outright.
    let normalized_ip_state = report.region.as_deref().and_then(normalize_state);
    if normalized_ip_state.as_deref() != Some(normalized_submitted.as_str()) {
        return LeadVerdict::rejected(
            "IP address geolocation (state) does not match submitted U.S. state.",
            json!({
                "client_ip": client_ip,
                "ip_state_normalized": normalized_ip_state,
                "submitted_state_normalized": normalized_submitted,
                "ip_state_raw": report.region,
                "submitted_state_raw": lead.submitted_state,
            }),
        );
    }

    LeadVerdict::genuine(
        "Lead passed all verification checks.",
        json!({
            "client_ip": client_ip,
            "time_on_page": lead.time_on_page,
            "ip_state": report.region,
            "submitted_state": lead.submitted_state,
            "fraud_score": report.fraud_score,
        }),
    )
}

/// Uppercase the first character only, like Python's `str.capitalize` minus
/// the lowercasing of the tail ("proxy, vpn" -> "Proxy, vpn").
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(state: &str) -> LeadSubmission {
        LeadSubmission {
            submitted_state: state.to_string(),
            time_on_page: 15,
            user_agent: "Mozilla/5.0 (test)".to_string(),
        }
    }

    fn clean_us_report(region: &str) -> ReputationReport {
        ReputationReport {
            success: true,
            country_code: Some("US".to_string()),
            region: Some(region.to_string()),
            fraud_score: Some(5.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_report_matching_state_is_genuine() {
        let verdict = assess_report(&lead("New York"), "203.0.113.7", &clean_us_report("New York"));
        assert!(verdict.is_genuine);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("Lead passed all verification checks.")
        );
        let details = verdict.details.unwrap();
        assert_eq!(details["client_ip"], "203.0.113.7");
        assert_eq!(details["fraud_score"], 5.0);
    }

    #[test]
    fn test_abbreviation_matches_full_region_name() {
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &clean_us_report("New York"));
        assert!(verdict.is_genuine);
    }

    #[test]
    fn test_single_proxy_flag_capitalized() {
        let report = ReputationReport {
            success: true,
            proxy: true,
            fraud_score: Some(88.0),
            ..Default::default()
        };
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &report);
        assert!(!verdict.is_genuine);
        assert_eq!(verdict.reason.as_deref(), Some("Proxy detected."));
        let details = verdict.details.unwrap();
        assert_eq!(details["proxy"], true);
        assert_eq!(details["fraud_score"], 88.0);
    }

    #[test]
    fn test_multiple_flags_joined_in_order() {
        let report = ReputationReport {
            success: true,
            vpn: true,
            tor: true,
            ..Default::default()
        };
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &report);
        assert_eq!(verdict.reason.as_deref(), Some("Vpn, tor detected."));
    }

    #[test]
    fn test_anonymization_checked_before_country() {
        // A Tor exit outside the US must report the Tor flag, not the country
        let report = ReputationReport {
            success: true,
            tor: true,
            country_code: Some("DE".to_string()),
            ..Default::default()
        };
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &report);
        assert_eq!(verdict.reason.as_deref(), Some("Tor detected."));
    }

    #[test]
    fn test_non_us_country_rejected() {
        let report = ReputationReport {
            success: true,
            country_code: Some("CA".to_string()),
            region: Some("Ontario".to_string()),
            ..Default::default()
        };
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &report);
        assert!(!verdict.is_genuine);
        assert_eq!(verdict.reason.as_deref(), Some("IP address is not from the U.S."));
        let details = verdict.details.unwrap();
        assert_eq!(details["ip_country"], "CA");
    }

    #[test]
    fn test_missing_country_code_rejected() {
        let report = ReputationReport {
            success: true,
            ..Default::default()
        };
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &report);
        assert_eq!(verdict.reason.as_deref(), Some("IP address is not from the U.S."));
    }

    #[test]
    fn test_invalid_submitted_state_rejected() {
        let verdict = assess_report(
            &lead("Atlantis"),
            "203.0.113.7",
            &clean_us_report("New York"),
        );
        assert!(!verdict.is_genuine);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("Submitted state is not a valid U.S. state name or abbreviation.")
        );
        let details = verdict.details.unwrap();
        assert_eq!(details["submitted_state_raw"], "Atlantis");
    }

    #[test]
    fn test_geolocation_mismatch_rejected_with_both_sides() {
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &clean_us_report("California"));
        assert!(!verdict.is_genuine);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("IP address geolocation (state) does not match submitted U.S. state.")
        );
        let details = verdict.details.unwrap();
        assert_eq!(details["ip_state_normalized"], "california");
        assert_eq!(details["submitted_state_normalized"], "new york");
        assert_eq!(details["ip_state_raw"], "California");
        assert_eq!(details["submitted_state_raw"], "NY");
    }

    #[test]
    fn test_missing_region_fails_consistency_check() {
        let report = ReputationReport {
            success: true,
            country_code: Some("US".to_string()),
            ..Default::default()
        };
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &report);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("IP address geolocation (state) does not match submitted U.S. state.")
        );
    }

    #[test]
    fn test_unrecognized_region_fails_consistency_check() {
        let verdict = assess_report(&lead("NY"), "203.0.113.7", &clean_us_report("Bavaria"));
        assert_eq!(
            verdict.reason.as_deref(),
            Some("IP address geolocation (state) does not match submitted U.S. state.")
        );
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("proxy"), "Proxy");
        assert_eq!(capitalize_first("proxy, vpn, tor"), "Proxy, vpn, tor");
        assert_eq!(capitalize_first(""), "");
    }

    #[tokio::test]
    async fn test_missing_client_ip_short_circuits() {
        let verdict = verify_lead(&lead("NY"), None, None).await;
        assert!(!verdict.is_genuine);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("Could not determine client IP address.")
        );
        assert!(verdict.details.is_none());
    }

    #[tokio::test]
    async fn test_low_time_on_page_short_circuits() {
        for seconds in 0..=MIN_TIME_ON_PAGE_SECS {
            let mut submission = lead("NY");
            submission.time_on_page = seconds;
            let verdict = verify_lead(&submission, Some("203.0.113.7"), None).await;
            assert!(!verdict.is_genuine);
            assert_eq!(verdict.reason.as_deref(), Some("Low time on page."));
            let details = verdict.details.unwrap();
            assert_eq!(details["time_on_page"], seconds);
            assert_eq!(details["requirement"], "> 2 seconds");
        }
    }

    #[tokio::test]
    async fn test_unconfigured_service_fails_closed() {
        let verdict = verify_lead(&lead("NY"), Some("203.0.113.7"), None).await;
        assert!(!verdict.is_genuine);
        assert_eq!(
            verdict.reason.as_deref(),
            Some(
                "IP validation service not configured (API key missing). Cannot verify IP-related criteria."
            )
        );
    }
}
