use crate::aggregator::aggregate;
use crate::config::Config;
use crate::error::ScanError;
use crate::extractor::{ExtractedSignals, SignalExtractor};
use crate::record::{build_record, ScanRecord, ScanStore};
use crate::reputation::normalize::{classify_domain_registration, classify_url_scan};
use crate::reputation::{
    domain_registration::WhoisXmlClient, threat_list::SafeBrowsingClient,
    url_scan::VirusTotalClient, DomainRegistrationSource, ReputationClass, ReputationResult,
    ThreatListSource, UrlScanSource,
};
use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use url::Url;

/// Orchestrates one scan: extract signals, fan out to the three reputation
/// sources, normalize, aggregate, persist. Each scan's state is local to the
/// request; the engine itself holds only clients and the store handle.
pub struct ScanEngine {
    extractor: SignalExtractor,
    threat_list: Arc<dyn ThreatListSource>,
    url_scan: Arc<dyn UrlScanSource>,
    domain_registration: Arc<dyn DomainRegistrationSource>,
    store: Arc<dyn ScanStore>,
}

impl ScanEngine {
    pub fn new(
        threat_list: Arc<dyn ThreatListSource>,
        url_scan: Arc<dyn UrlScanSource>,
        domain_registration: Arc<dyn DomainRegistrationSource>,
        store: Arc<dyn ScanStore>,
    ) -> Result<Self> {
        Ok(ScanEngine {
            extractor: SignalExtractor::new()?,
            threat_list,
            url_scan,
            domain_registration,
            store,
        })
    }

    /// Build an engine backed by the real HTTP clients.
    pub fn from_config(config: &Config, store: Arc<dyn ScanStore>) -> Result<Self> {
        let threat_list = SafeBrowsingClient::new(
            &config.threat_list.api_key,
            &config.threat_list.endpoint,
            config.timeout_seconds,
        )?;
        let url_scan = VirusTotalClient::new(
            &config.url_scan.api_key,
            &config.url_scan.endpoint,
            config.timeout_seconds,
        )?;
        let domain_registration = WhoisXmlClient::new(
            &config.domain_registration.api_key,
            &config.domain_registration.endpoint,
            config.timeout_seconds,
        )?;
        ScanEngine::new(
            Arc::new(threat_list),
            Arc::new(url_scan),
            Arc::new(domain_registration),
            store,
        )
    }

    /// The single entry point. Fails fast with InvalidInput on empty text;
    /// partial reputation-source failure degrades the affected results but
    /// never prevents scoring.
    pub async fn submit_scan(
        &self,
        email_text: &str,
        principal_id: &str,
    ) -> Result<ScanRecord, ScanError> {
        let signals = self.extractor.extract(email_text)?;
        log::info!(
            "scanning for {principal_id}: {} urls, {} keyword matches",
            signals.urls.len(),
            signals.matched_keywords.len()
        );

        let domains = registration_targets(&signals);

        // One batched threat-list call; per-item calls fan out concurrently.
        // join_all preserves input order in its output, which keeps the
        // result list deterministic.
        let (threat_matches, url_outcomes, domain_outcomes) = tokio::join!(
            self.threat_list.check_threat_list(&signals.urls),
            join_all(
                signals
                    .urls
                    .iter()
                    .map(|url| self.url_scan.check_url_reputation(url))
            ),
            join_all(
                domains
                    .iter()
                    .map(|domain| self.domain_registration.check_domain_registration(domain))
            ),
        );

        let mut results =
            Vec::with_capacity(threat_matches.len() + url_outcomes.len() + domain_outcomes.len());
        for matched in threat_matches {
            results.push(ReputationResult::ThreatList {
                class: ReputationClass::Malicious,
                matched,
            });
        }
        for outcome in url_outcomes {
            results.push(ReputationResult::UrlScan {
                class: classify_url_scan(&outcome),
                outcome,
            });
        }
        for outcome in domain_outcomes {
            results.push(ReputationResult::DomainRegistration {
                class: classify_domain_registration(&outcome),
                outcome,
            });
        }

        let assessment = aggregate(signals, results);
        let record = build_record(assessment, principal_id, email_text);
        self.store.create(record).await
    }
}

/// Domains to run registration lookups against: each URL's hostname in
/// extraction order (unparseable URLs are skipped), then the sender domain.
fn registration_targets(signals: &ExtractedSignals) -> Vec<String> {
    let mut targets = Vec::new();
    for url in &signals.urls {
        match Url::parse(url) {
            Ok(parsed) => {
                if let Some(host) = parsed.host_str() {
                    targets.push(host.to_lowercase());
                }
            }
            Err(e) => log::warn!("skipping registration lookup for unparseable url {url}: {e}"),
        }
    }
    if let Some(domain) = &signals.sender_domain {
        targets.push(domain.clone());
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RiskCategory;
    use crate::record::{MemoryScanStore, NewScanRecord};
    use crate::reputation::{SourceOutcome, ThreatEntry, ThreatMatch};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockThreatList {
        matches: Vec<ThreatMatch>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ThreatListSource for MockThreatList {
        async fn check_threat_list(&self, urls: &[String]) -> Vec<ThreatMatch> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if urls.is_empty() {
                Vec::new()
            } else {
                self.matches.clone()
            }
        }
    }

    #[derive(Default)]
    struct MockUrlScan {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UrlScanSource for MockUrlScan {
        async fn check_url_reputation(&self, url: &str) -> SourceOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                SourceOutcome::failed(url, "unreachable")
            } else {
                SourceOutcome::succeeded(
                    url,
                    json!({ "data": { "attributes": { "reputation": 1 } } }),
                )
            }
        }
    }

    #[derive(Default)]
    struct MockRegistration {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DomainRegistrationSource for MockRegistration {
        async fn check_domain_registration(&self, domain: &str) -> SourceOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                SourceOutcome::failed(domain, "unreachable")
            } else {
                SourceOutcome::succeeded(
                    domain,
                    json!({ "WhoisRecord": {
                        "domainName": domain,
                        "registrarName": "Example Registrar"
                    }}),
                )
            }
        }
    }

    fn engine(
        threat_list: Arc<MockThreatList>,
        url_scan: Arc<MockUrlScan>,
        registration: Arc<MockRegistration>,
    ) -> ScanEngine {
        ScanEngine::new(
            threat_list,
            url_scan,
            registration,
            Arc::new(MemoryScanStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_external_calls() {
        let threat_list = Arc::new(MockThreatList::default());
        let url_scan = Arc::new(MockUrlScan::default());
        let registration = Arc::new(MockRegistration::default());
        let engine = engine(threat_list.clone(), url_scan.clone(), registration.clone());

        let result = engine.submit_scan("   \n ", "user-1").await;
        assert!(matches!(result, Err(ScanError::InvalidInput)));
        assert_eq!(threat_list.calls.load(Ordering::SeqCst), 0);
        assert_eq!(url_scan.calls.load(Ordering::SeqCst), 0);
        assert_eq!(registration.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_benign_text_scores_zero_safe() {
        let engine = engine(
            Arc::new(MockThreatList::default()),
            Arc::new(MockUrlScan::default()),
            Arc::new(MockRegistration::default()),
        );
        let record = engine
            .submit_scan("hello, lunch on tuesday?", "user-1")
            .await
            .unwrap();
        assert_eq!(record.assessment.score, 0);
        assert_eq!(record.assessment.category, RiskCategory::Safe);
        assert!(record.assessment.results.is_empty());
    }

    #[tokio::test]
    async fn test_flagged_url_failed_scan_two_keywords() {
        // Threat-list hit (+30), failed url scan (+20), two keywords (+20).
        let threat_list = Arc::new(MockThreatList {
            matches: vec![ThreatMatch {
                threat_type: "SOCIAL_ENGINEERING".to_string(),
                platform_type: None,
                threat: ThreatEntry {
                    url: "https://bad.example/login".to_string(),
                },
            }],
            calls: AtomicUsize::new(0),
        });
        let url_scan = Arc::new(MockUrlScan {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let engine = engine(
            threat_list,
            url_scan,
            Arc::new(MockRegistration::default()),
        );

        let text = "verify your account, account locked: https://bad.example/login";
        let record = engine.submit_scan(text, "user-1").await.unwrap();
        assert_eq!(record.assessment.score, 70);
        assert_eq!(record.assessment.category, RiskCategory::Suspicious);
    }

    #[tokio::test]
    async fn test_failed_registration_lookup_degrades_without_penalty() {
        let registration = Arc::new(MockRegistration {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let engine = engine(
            Arc::new(MockThreatList::default()),
            Arc::new(MockUrlScan::default()),
            registration.clone(),
        );

        let text = "From: a <x@sender.example>\nsee https://site.example/page";
        let record = engine.submit_scan(text, "user-1").await.unwrap();

        // URL hostname and sender domain both looked up.
        assert_eq!(registration.calls.load(Ordering::SeqCst), 2);
        let classes: Vec<ReputationClass> = record
            .assessment
            .results
            .iter()
            .filter(|r| matches!(r, ReputationResult::DomainRegistration { .. }))
            .map(|r| r.class())
            .collect();
        assert_eq!(classes, vec![ReputationClass::Error, ReputationClass::Error]);
        assert_eq!(record.assessment.score, 0);
    }

    #[tokio::test]
    async fn test_result_order_follows_extraction_order() {
        let engine = engine(
            Arc::new(MockThreatList::default()),
            Arc::new(MockUrlScan::default()),
            Arc::new(MockRegistration::default()),
        );
        let text = "https://one.example https://two.example https://one.example";
        let record = engine.submit_scan(text, "user-1").await.unwrap();

        let url_keys: Vec<&str> = record
            .assessment
            .results
            .iter()
            .filter(|r| matches!(r, ReputationResult::UrlScan { .. }))
            .map(|r| r.key())
            .collect();
        assert_eq!(
            url_keys,
            vec![
                "https://one.example",
                "https://two.example",
                "https://one.example"
            ]
        );

        let domain_keys: Vec<&str> = record
            .assessment
            .results
            .iter()
            .filter(|r| matches!(r, ReputationResult::DomainRegistration { .. }))
            .map(|r| r.key())
            .collect();
        assert_eq!(domain_keys, vec!["one.example", "two.example", "one.example"]);
    }

    #[tokio::test]
    async fn test_persistence_failure_surfaces() {
        struct RejectingStore;

        #[async_trait]
        impl ScanStore for RejectingStore {
            async fn create(&self, _record: NewScanRecord) -> Result<ScanRecord, ScanError> {
                Err(ScanError::PersistenceFailure("store offline".to_string()))
            }
            async fn find_by_id(&self, _id: &str) -> Result<Option<ScanRecord>, ScanError> {
                Ok(None)
            }
            async fn find_by_owner(&self, _p: &str) -> Result<Vec<ScanRecord>, ScanError> {
                Ok(Vec::new())
            }
        }

        let engine = ScanEngine::new(
            Arc::new(MockThreatList::default()),
            Arc::new(MockUrlScan::default()),
            Arc::new(MockRegistration::default()),
            Arc::new(RejectingStore),
        )
        .unwrap();

        let result = engine.submit_scan("plain text", "user-1").await;
        assert!(matches!(result, Err(ScanError::PersistenceFailure(_))));
    }

    #[test]
    fn test_registration_targets_skip_unparseable_urls() {
        let signals = ExtractedSignals {
            urls: vec![
                "https://good.example/a".to_string(),
                "https://".to_string(),
            ],
            sender_domain: Some("sender.example".to_string()),
            matched_keywords: Vec::new(),
        };
        assert_eq!(
            registration_targets(&signals),
            vec!["good.example", "sender.example"]
        );
    }
}
