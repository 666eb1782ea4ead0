use crate::error::ScanError;
use crate::reputation::{http_client, SourceOutcome, UrlScanSource};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::Client;
use serde_json::Value;

const SOURCE: &str = "url-scan";

/// The scan-aggregator addresses URLs by their unpadded URL-safe base64
/// encoding (VirusTotal v3 URL identifier format).
pub fn url_identifier(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

/// Client for the VirusTotal v3 URL report endpoint. One URL per call.
pub struct VirusTotalClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl VirusTotalClient {
    pub fn new(
        api_key: &str,
        endpoint: &str,
        timeout_seconds: u64,
    ) -> Result<Self, reqwest::Error> {
        Ok(VirusTotalClient {
            client: http_client(timeout_seconds)?,
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn query(&self, url: &str) -> Result<Value, ScanError> {
        let request_url = format!("{}/{}", self.endpoint, url_identifier(url));
        let response = self
            .client
            .get(&request_url)
            .header("x-apikey", &self.api_key)
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
impl UrlScanSource for VirusTotalClient {
    async fn check_url_reputation(&self, url: &str) -> SourceOutcome {
        match self.query(url).await {
            Ok(payload) => SourceOutcome::succeeded(url, payload),
            Err(e) => {
                log::debug!("url scan failed for {url}: {e}");
                SourceOutcome::failed(url, e.to_string())
            }
        }
    }
}
