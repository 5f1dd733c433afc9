//! HTTP client for the messaging platform's open API
//!
//! Authenticates with `x-access-key` / `x-access-secret` headers. Reads use
//! the platform's page limit of 500; paging beyond that is left to callers
//! narrowing their windows.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::config::PlatformConfig;
use crate::error::{Error, Result};

use super::types::{ChatTagsResponse, GroupsResponse, UserChatsResponse};

/// Page size for open API list endpoints
const PAGE_LIMIT: u32 = 500;

/// HTTP client for the open API
pub struct OpenApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenApiClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the access credentials are missing.
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.open_api_base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(access_key) = &config.access_key {
            headers.insert(
                "x-access-key",
                HeaderValue::from_str(access_key)
                    .map_err(|e| Error::Config(format!("invalid access_key: {}", e)))?,
            );
        }
        if let Some(access_secret) = &config.access_secret {
            headers.insert(
                "x-access-secret",
                HeaderValue::from_str(access_secret)
                    .map_err(|e| Error::Config(format!("invalid access_secret: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Fetch all chat tags (one page)
    pub async fn chat_tags(&self) -> Result<ChatTagsResponse> {
        let url = format!("{}/chat-tags?limit={}", self.base_url, PAGE_LIMIT);
        self.get_json(&url).await
    }

    /// Fetch conversations created in `[since, until]` (epoch millis)
    pub async fn user_chats(&self, since: i64, until: i64) -> Result<UserChatsResponse> {
        let url = format!(
            "{}/user-chats?since={}&until={}&limit={}",
            self.base_url, since, until, PAGE_LIMIT
        );
        self.get_json(&url).await
    }

    /// Fetch all teams (groups)
    pub async fn groups(&self) -> Result<GroupsResponse> {
        let url = format!("{}/groups", self.base_url);
        self.get_json(&url).await
    }

    /// Post a plain-text message into a team chat
    pub async fn send_team_message(&self, team_id: &str, text: &str) -> Result<()> {
        let url = format!(
            "{}/groups/{}/messages",
            self.base_url,
            urlencoding::encode(team_id)
        );

        let response = self
            .http_client
            .post(&url)
            .json(&serde_json::json!({ "plainText": text }))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Upstream(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "Open API GET");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::Upstream(format!("failed to parse response: {}", e)))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Upstream(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_credentials() {
        let config = PlatformConfig::default();
        assert!(OpenApiClient::new(&config).is_err());
    }

    #[test]
    fn test_client_with_credentials() {
        let config = PlatformConfig {
            access_key: Some("key".to_string()),
            access_secret: Some("secret".to_string()),
            ..Default::default()
        };
        let client = OpenApiClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://api.channel.io/open/v5");
    }
}
