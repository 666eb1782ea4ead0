//! Narrative summary generation. This sits outside the scoring path: a scan
//! is complete before a summary is ever requested, and a summary failure
//! never invalidates the assessment.

use crate::error::ScanError;
use crate::reputation::http_client;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const SOURCE: &str = "summary";

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        email_preview: &str,
        risk_score: u32,
        keywords: &[String],
    ) -> Result<String, ScanError>;
}

/// Client for a Gemini-style `generateContent` endpoint.
pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiSummarizer {
    pub fn new(
        api_key: &str,
        endpoint: &str,
        timeout_seconds: u64,
    ) -> Result<Self, reqwest::Error> {
        Ok(GeminiSummarizer {
            client: http_client(timeout_seconds)?,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

fn build_prompt(email_preview: &str, risk_score: u32, keywords: &[String]) -> String {
    format!(
        "Analyze the following email and risk data:\n\
         - Risk Score: {risk_score}\n\
         - Suspicious Keywords: {}\n\
         - Email Content: \"\"\"{email_preview}\"\"\"\n\n\
         Please summarize: is this email likely safe, suspicious, or phishing? \
         Explain why in 2-3 sentences and highlight the important findings.",
        keywords.join(", ")
    )
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(
        &self,
        email_preview: &str,
        risk_score: u32,
        keywords: &[String],
    ) -> Result<String, ScanError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": build_prompt(email_preview, risk_score, keywords) }]
            }]
        });

        let request_url = format!("{}?key={}", self.endpoint, self.api_key);
        let response = self
            .client
            .post(&request_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScanError::unavailable(SOURCE, e))?
            .error_for_status()
            .map_err(|e| ScanError::unavailable(SOURCE, e))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ScanError::unavailable(SOURCE, e))?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(|text| text.to_string())
            .ok_or_else(|| ScanError::unavailable(SOURCE, "response contained no summary text"))
    }
}
