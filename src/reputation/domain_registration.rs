use crate::error::ScanError;
use crate::reputation::{http_client, DomainRegistrationSource, SourceOutcome};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const SOURCE: &str = "domain-registration";

/// Client for the WhoisXML `WhoisService` endpoint. One domain per call,
/// JSON output requested explicitly.
pub struct WhoisXmlClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl WhoisXmlClient {
    pub fn new(
        api_key: &str,
        endpoint: &str,
        timeout_seconds: u64,
    ) -> Result<Self, reqwest::Error> {
        Ok(WhoisXmlClient {
            client: http_client(timeout_seconds)?,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    async fn query(&self, domain: &str) -> Result<Value, ScanError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("domainName", domain),
                ("outputFormat", "JSON"),
            ])
            .send()
            .await
            .map_err(|e| ScanError::unavailable(SOURCE, e))?
            .error_for_status()
            .map_err(|e| ScanError::unavailable(SOURCE, e))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| ScanError::unavailable(SOURCE, e))
    }
}

#[async_trait]
impl DomainRegistrationSource for WhoisXmlClient {
    async fn check_domain_registration(&self, domain: &str) -> SourceOutcome {
        match self.query(domain).await {
            Ok(payload) => SourceOutcome::succeeded(domain, payload),
            Err(e) => {
                log::debug!("whois lookup failed for {domain}: {e}");
                SourceOutcome::failed(domain, e.to_string())
            }
        }
    }
}
