use crate::extractor::ExtractedSignals;
use crate::reputation::{ReputationClass, ReputationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Fixed scoring weights. Reweighting is a code change, not a parameter.
pub const THREAT_LIST_WEIGHT: u32 = 30;
pub const URL_SCAN_WEIGHT: u32 = 20;
pub const KEYWORD_WEIGHT: u32 = 10;
pub const DOMAIN_REGISTRATION_WEIGHT: u32 = 30;
pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Safe,
    Suspicious,
    Phishing,
}

impl RiskCategory {
    /// Monotonic mapping from score to verdict. Boundaries are strict:
    /// exactly 70 is Suspicious, exactly 30 is Safe.
    pub fn from_score(score: u32) -> Self {
        if score > 70 {
            RiskCategory::Phishing
        } else if score > 30 {
            RiskCategory::Suspicious
        } else {
            RiskCategory::Safe
        }
    }
}

/// Output of one completed scan. Created once per submission, immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub category: RiskCategory,
    pub signals: ExtractedSignals,
    pub results: Vec<ReputationResult>,
    pub scanned_at: DateTime<Utc>,
}

/// Combine extracted signals and normalized reputation results into a score
/// and category. Each condition is boolean-gated before its weight is added;
/// only the keyword term is linear, and the total is clamped to 100.
pub fn aggregate(signals: ExtractedSignals, results: Vec<ReputationResult>) -> RiskAssessment {
    let mut score: u32 = 0;

    let threat_hits = results
        .iter()
        .filter(|r| matches!(r, ReputationResult::ThreatList { .. }))
        .count();
    if threat_hits > 0 {
        score += THREAT_LIST_WEIGHT;
    }

    let url_scan_flagged = results.iter().any(|r| match r {
        ReputationResult::UrlScan { class, .. } => {
            matches!(class, ReputationClass::Error | ReputationClass::Malicious)
        }
        _ => false,
    });
    if url_scan_flagged {
        score += URL_SCAN_WEIGHT;
    }

    score += KEYWORD_WEIGHT * signals.matched_keywords.len() as u32;

    let registration_malicious = results.iter().any(|r| {
        matches!(
            r,
            ReputationResult::DomainRegistration {
                class: ReputationClass::Malicious,
                ..
            }
        )
    });
    if registration_malicious {
        score += DOMAIN_REGISTRATION_WEIGHT;
    }

    let score = score.min(MAX_SCORE);
    let category = RiskCategory::from_score(score);
    log::info!(
        "risk score {score} ({category:?}): {threat_hits} threat-list hits, \
         url-scan flagged {url_scan_flagged}, {} keywords, \
         registration malicious {registration_malicious}",
        signals.matched_keywords.len()
    );

    RiskAssessment {
        score,
        category,
        signals,
        results,
        scanned_at: Utc::now(),
    }
}
