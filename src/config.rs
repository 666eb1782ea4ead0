use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_THREAT_LIST_ENDPOINT: &str =
    "https://safebrowsing.googleapis.com/v4/threatMatches:find";
pub const DEFAULT_URL_SCAN_ENDPOINT: &str = "https://www.virustotal.com/api/v3/urls";
pub const DEFAULT_DOMAIN_REGISTRATION_ENDPOINT: &str =
    "https://www.whoisxmlapi.com/whoisserver/WhoisService";
pub const DEFAULT_SUMMARY_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

fn default_timeout_seconds() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub api_key: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Per-call HTTP timeout applied to every reputation source.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    pub threat_list: SourceConfig,
    pub url_scan: SourceConfig,
    pub domain_registration: SourceConfig,
    /// Narrative summary generation; optional, outside the scoring path.
    #[serde(default)]
    pub summary: Option<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timeout_seconds: default_timeout_seconds(),
            threat_list: SourceConfig {
                api_key: "your-safe-browsing-api-key".to_string(),
                endpoint: DEFAULT_THREAT_LIST_ENDPOINT.to_string(),
            },
            url_scan: SourceConfig {
                api_key: "your-virustotal-api-key".to_string(),
                endpoint: DEFAULT_URL_SCAN_ENDPOINT.to_string(),
            },
            domain_registration: SourceConfig {
                api_key: "your-whoisxml-api-key".to_string(),
                endpoint: DEFAULT_DOMAIN_REGISTRATION_ENDPOINT.to_string(),
            },
            summary: Some(SourceConfig {
                api_key: "your-gemini-api-key".to_string(),
                endpoint: DEFAULT_SUMMARY_ENDPOINT.to_string(),
            }),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read config {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {path}"))?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).with_context(|| format!("failed to write config {path}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.timeout_seconds, 10);
        assert_eq!(parsed.threat_list.endpoint, DEFAULT_THREAT_LIST_ENDPOINT);
        assert!(parsed.summary.is_some());
    }

    #[test]
    fn test_timeout_and_summary_are_optional_in_yaml() {
        let yaml = r#"
threat_list:
  api_key: k1
  endpoint: https://tl.example
url_scan:
  api_key: k2
  endpoint: https://vt.example
domain_registration:
  api_key: k3
  endpoint: https://whois.example
"#;
        let parsed: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.timeout_seconds, 10);
        assert!(parsed.summary.is_none());
    }
}
