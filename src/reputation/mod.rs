pub mod domain_registration;
pub mod normalize;
pub mod threat_list;
pub mod url_scan;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Normalized reputation vocabulary shared by all three sources. Exactly one
/// class is assigned per completed query; failed queries map to Error and are
/// never dropped from the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationClass {
    Good,
    Malicious,
    Unknown,
    Error,
}

/// One entry from the threat-list source's `matches` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatMatch {
    pub threat_type: String,
    #[serde(default)]
    pub platform_type: Option<String>,
    pub threat: ThreatEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub url: String,
}

/// Captured outcome of a single per-item source call. Transport and API
/// failures never propagate past the client boundary; they land here with
/// `success: false` and the error text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub key: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SourceOutcome {
    pub fn succeeded(key: &str, payload: Value) -> Self {
        SourceOutcome {
            key: key.to_string(),
            success: true,
            payload: Some(payload),
            error_message: None,
        }
    }

    pub fn failed(key: &str, message: impl Into<String>) -> Self {
        SourceOutcome {
            key: key.to_string(),
            success: false,
            payload: None,
            error_message: Some(message.into()),
        }
    }
}

/// One normalized reputation result, tagged by source so downstream code can
/// handle each source's shape exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ReputationResult {
    ThreatList {
        class: ReputationClass,
        matched: ThreatMatch,
    },
    UrlScan {
        class: ReputationClass,
        outcome: SourceOutcome,
    },
    DomainRegistration {
        class: ReputationClass,
        outcome: SourceOutcome,
    },
}

impl ReputationResult {
    pub fn class(&self) -> ReputationClass {
        match self {
            ReputationResult::ThreatList { class, .. }
            | ReputationResult::UrlScan { class, .. }
            | ReputationResult::DomainRegistration { class, .. } => *class,
        }
    }

    /// The URL or domain this result is about.
    pub fn key(&self) -> &str {
        match self {
            ReputationResult::ThreatList { matched, .. } => &matched.threat.url,
            ReputationResult::UrlScan { outcome, .. }
            | ReputationResult::DomainRegistration { outcome, .. } => &outcome.key,
        }
    }
}

/// Batched URL threat-list lookup. A transport or API failure yields an
/// empty match list, indistinguishable from "no threats" (see DESIGN.md).
#[async_trait]
pub trait ThreatListSource: Send + Sync {
    async fn check_threat_list(&self, urls: &[String]) -> Vec<ThreatMatch>;
}

/// Per-URL antivirus-aggregation lookup. Never returns an error; failures
/// are captured into the outcome.
#[async_trait]
pub trait UrlScanSource: Send + Sync {
    async fn check_url_reputation(&self, url: &str) -> SourceOutcome;
}

/// Per-domain registration (whois) lookup. Same no-throw capture contract.
#[async_trait]
pub trait DomainRegistrationSource: Send + Sync {
    async fn check_domain_registration(&self, domain: &str) -> SourceOutcome;
}

pub(crate) fn http_client(timeout_seconds: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("phishguard/", env!("CARGO_PKG_VERSION")))
        .build()
}
