//! Narrative analysis client
//!
//! Sends the weekly report payload to an LLM messages API and extracts the
//! analysis text. This client never surfaces errors to callers: any failure
//! becomes a readable fallback string, so report generation keeps going
//! when the analysis backend is down.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::config::NarrativeConfig;
use crate::error::{Error, Result};

const API_VERSION: &str = "2023-06-01";

/// Narrative analysis seam.
///
/// Implementations must always return text; failure handling (fallback
/// wording included) is theirs, not the caller's.
#[async_trait]
pub trait NarrativeClient: Send + Sync {
    async fn analyze(&self, report_json: &str) -> String;
}

/// LLM-backed narrative client.
pub struct NarrativeApiClient {
    http_client: reqwest::Client,
    config: NarrativeConfig,
    base_url: String,
}

impl NarrativeApiClient {
    /// Create a client from configuration. Requires an API key (config or
    /// the NARRATIVE_API_KEY env var).
    pub fn new(config: &NarrativeConfig) -> Result<Self> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| Error::Config("narrative.api_key is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: config.clone(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn request_analysis(&self, report_json: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": self.config.system_prompt,
            "messages": [{ "role": "user", "content": report_json }],
        });

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Upstream(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("failed to parse response: {}", e)))?;

        body["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Upstream("response carried no text content".to_string()))
    }
}

#[async_trait]
impl NarrativeClient for NarrativeApiClient {
    async fn analyze(&self, report_json: &str) -> String {
        tracing::info!(bytes = report_json.len(), "Requesting narrative analysis");

        match self.request_analysis(report_json).await {
            Ok(text) => {
                tracing::info!("Narrative analysis completed");
                text
            }
            Err(e) => {
                tracing::error!(error = %e, "Narrative analysis failed, using fallback");
                format!("Narrative analysis is unavailable: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = NarrativeConfig::default();
        if config.resolved_api_key().is_none() {
            assert!(NarrativeApiClient::new(&config).is_err());
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let config = NarrativeConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 1,
            ..Default::default()
        };
        let client = NarrativeApiClient::new(&config).unwrap();

        let text = client.analyze("{}").await;
        assert!(text.contains("unavailable"));
    }
}
