use crate::error::ScanError;
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fixed phrase dictionary checked against the lowercased email body.
/// Reweighting or extending this list is a code change, not configuration.
pub const SUSPICIOUS_KEYWORDS: [&str; 5] = [
    "urgent action required",
    "verify your account",
    "click here immediately",
    "password expired",
    "account locked",
];

/// Structured signals derived from one email submission. Purely derived
/// from the input text and never mutated after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSignals {
    /// URLs in order of first appearance, duplicates retained. A URL that
    /// appears twice is scanned twice.
    pub urls: Vec<String>,
    pub sender_domain: Option<String>,
    pub matched_keywords: Vec<String>,
}

pub struct SignalExtractor {
    url_pattern: Regex,
    from_pattern: Regex,
    mailed_by_pattern: Regex,
}

impl SignalExtractor {
    pub fn new() -> Result<Self> {
        // Patterns are fixed, compile them once up front
        Ok(SignalExtractor {
            url_pattern: Regex::new(r"https?://\S+")?,
            from_pattern: Regex::new(r"(?i)from:\s*.*<([^>]+)>")?,
            mailed_by_pattern: Regex::new(r"(?i)mailed-by:\s*(\S+)")?,
        })
    }

    /// Parse raw email text into ExtractedSignals. Empty or whitespace-only
    /// input is rejected before any external call is made.
    pub fn extract(&self, text: &str) -> Result<ExtractedSignals, ScanError> {
        if text.trim().is_empty() {
            return Err(ScanError::InvalidInput);
        }

        let urls: Vec<String> = self
            .url_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        let sender_domain = self.sender_domain(text);

        let lowered = text.to_lowercase();
        let matched_keywords: Vec<String> = SUSPICIOUS_KEYWORDS
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .map(|keyword| keyword.to_string())
            .collect();

        log::debug!(
            "extracted {} urls, {} keyword matches, sender domain {:?}",
            urls.len(),
            matched_keywords.len(),
            sender_domain
        );

        Ok(ExtractedSignals {
            urls,
            sender_domain,
            matched_keywords,
        })
    }

    /// Sender domain from a `From: Name <user@domain>` header line, falling
    /// back to a `mailed-by: domain` line. First matching pattern wins; a
    /// From match without a usable address yields no domain rather than
    /// falling through.
    fn sender_domain(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.from_pattern.captures(text) {
            let address = caps.get(1)?.as_str();
            return address
                .rfind('@')
                .map(|at| address[at + 1..].to_string())
                .filter(|domain| !domain.is_empty());
        }

        self.mailed_by_pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
