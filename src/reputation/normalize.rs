//! Maps raw source payloads onto the normalized ReputationClass vocabulary.
//!
//! The registration heuristic here is deliberately coarse (substring markers
//! in registrar and domain names). It is a placeholder signal kept for
//! compatibility, isolated behind this module so a real classifier can
//! replace it without touching the aggregator.

use crate::reputation::{ReputationClass, SourceOutcome};
use serde_json::Value;

/// Classify a domain-registration (whois) outcome.
///
/// Transport/API failure is Error. A response without a `WhoisRecord`, or one
/// whose record reports a `dataError`, carries no usable signal and is
/// Unknown. A registrar name containing "fraud" or a domain name containing
/// "fake" is Malicious; anything else is Good.
pub fn classify_domain_registration(outcome: &SourceOutcome) -> ReputationClass {
    if !outcome.success {
        return ReputationClass::Error;
    }

    let record = match outcome.payload.as_ref().and_then(|p| p.get("WhoisRecord")) {
        Some(record) => record,
        None => return ReputationClass::Unknown,
    };

    if record.get("dataError").is_some() {
        return ReputationClass::Unknown;
    }

    let registrar = record
        .get("registrarName")
        .and_then(Value::as_str)
        .unwrap_or("");
    let domain_name = record
        .get("domainName")
        .and_then(Value::as_str)
        .unwrap_or("");

    if registrar.to_lowercase().contains("fraud") || domain_name.contains("fake") {
        return ReputationClass::Malicious;
    }

    ReputationClass::Good
}

/// Classify a scan-aggregator outcome. Failure is Error; a negative
/// community reputation in the report is Malicious; anything else is Good.
pub fn classify_url_scan(outcome: &SourceOutcome) -> ReputationClass {
    if !outcome.success {
        return ReputationClass::Error;
    }

    let reputation = outcome
        .payload
        .as_ref()
        .and_then(|p| p.pointer("/data/attributes/reputation"))
        .and_then(Value::as_i64);

    match reputation {
        Some(score) if score < 0 => ReputationClass::Malicious,
        _ => ReputationClass::Good,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn whois_outcome(record: Value) -> SourceOutcome {
        SourceOutcome::succeeded("example.com", json!({ "WhoisRecord": record }))
    }

    #[test]
    fn test_failed_whois_is_error_never_malicious() {
        let outcome = SourceOutcome::failed("example.com", "connection refused");
        assert_eq!(classify_domain_registration(&outcome), ReputationClass::Error);
    }

    #[test]
    fn test_missing_whois_record_is_unknown() {
        let outcome = SourceOutcome::succeeded("example.com", json!({}));
        assert_eq!(
            classify_domain_registration(&outcome),
            ReputationClass::Unknown
        );
    }

    #[test]
    fn test_data_error_is_unknown() {
        let outcome = whois_outcome(json!({ "dataError": "MISSING_WHOIS_DATA" }));
        assert_eq!(
            classify_domain_registration(&outcome),
            ReputationClass::Unknown
        );
    }

    #[test]
    fn test_fraud_registrar_is_malicious() {
        let outcome = whois_outcome(json!({
            "domainName": "example.com",
            "registrarName": "Totally Fraud Registrations LLC"
        }));
        assert_eq!(
            classify_domain_registration(&outcome),
            ReputationClass::Malicious
        );
    }

    #[test]
    fn test_fake_domain_name_is_malicious() {
        let outcome = whois_outcome(json!({
            "domainName": "paypal-fake.example",
            "registrarName": "Example Registrar"
        }));
        assert_eq!(
            classify_domain_registration(&outcome),
            ReputationClass::Malicious
        );
    }

    #[test]
    fn test_ordinary_record_is_good() {
        let outcome = whois_outcome(json!({
            "domainName": "example.com",
            "registrarName": "Example Registrar Inc."
        }));
        assert_eq!(classify_domain_registration(&outcome), ReputationClass::Good);
    }

    #[test]
    fn test_failed_url_scan_is_error() {
        let outcome = SourceOutcome::failed("https://example.com", "timeout");
        assert_eq!(classify_url_scan(&outcome), ReputationClass::Error);
    }

    #[test]
    fn test_negative_reputation_is_malicious() {
        let outcome = SourceOutcome::succeeded(
            "https://example.com",
            json!({ "data": { "attributes": { "reputation": -12 } } }),
        );
        assert_eq!(classify_url_scan(&outcome), ReputationClass::Malicious);
    }

    #[test]
    fn test_non_negative_or_absent_reputation_is_good() {
        let positive = SourceOutcome::succeeded(
            "https://example.com",
            json!({ "data": { "attributes": { "reputation": 4 } } }),
        );
        assert_eq!(classify_url_scan(&positive), ReputationClass::Good);

        let absent = SourceOutcome::succeeded("https://example.com", json!({ "data": {} }));
        assert_eq!(classify_url_scan(&absent), ReputationClass::Good);
    }
}
