//! Document publishing
//!
//! Publishing a report is two platform calls: create an article through the
//! document API (basic auth), then drop the resulting link into the team's
//! chat through the open API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::config::PlatformConfig;
use crate::error::{Error, Result};

use super::client::OpenApiClient;
use super::types::CreateArticleResponse;

/// Outbound document publishing seam.
///
/// Returns the URL of the published document.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn publish(
        &self,
        team_id: &str,
        title: &str,
        subtitle: &str,
        body_html: &str,
    ) -> Result<String>;
}

/// Publishes report documents through the platform's document API and
/// notifies the target team.
pub struct DocumentPublisher {
    http_client: reqwest::Client,
    open_api: OpenApiClient,
    base_url: String,
    desk_base_url: String,
    channel_id: String,
    space_id: String,
    author_id: String,
}

impl DocumentPublisher {
    /// Create a publisher from configuration.
    ///
    /// Requires credentials plus the channel/space/author ids used to
    /// compose document links.
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        config.validate_publishing()?;

        let credentials = format!(
            "{}:{}",
            config.access_key.as_deref().unwrap_or_default(),
            config.access_secret.as_deref().unwrap_or_default()
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", encoded))
                .map_err(|e| Error::Config(format!("invalid credentials: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            open_api: OpenApiClient::new(config)?,
            base_url: config.document_api_base_url.trim_end_matches('/').to_string(),
            desk_base_url: config.desk_base_url.trim_end_matches('/').to_string(),
            channel_id: config.channel_id.clone().unwrap_or_default(),
            space_id: config.space_id.clone().unwrap_or_default(),
            author_id: config.author_id.clone().unwrap_or_default(),
        })
    }

    async fn create_article(
        &self,
        title: &str,
        subtitle: &str,
        body_html: &str,
    ) -> Result<CreateArticleResponse> {
        let url = format!("{}/spaces/$me/articles", self.base_url);
        let request = serde_json::json!({
            "authorId": self.author_id,
            "bodyHtml": body_html,
            "language": "en",
            "name": title,
            "subtitle": subtitle,
            "title": title,
        });

        let response = self
            .http_client
            .post(&url)
            .json(&request)
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

    fn document_url(&self, article_id: &str, revision_id: &str) -> String {
        format!(
            "{}/#/channels/{}/document/spaces/{}/articles/{}/revisions/{}?revisionFrom=all",
            self.desk_base_url, self.channel_id, self.space_id, article_id, revision_id
        )
    }
}

#[async_trait]
impl DocumentSink for DocumentPublisher {
    async fn publish(
        &self,
        team_id: &str,
        title: &str,
        subtitle: &str,
        body_html: &str,
    ) -> Result<String> {
        let article = self.create_article(title, subtitle, body_html).await?;
        let url = self.document_url(&article.article.id, &article.revision.id);

        self.open_api.send_team_message(team_id, &url).await?;

        tracing::info!(team_id, url = %url, "Document published and sent to team");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publishing_config() -> PlatformConfig {
        PlatformConfig {
            access_key: Some("key".to_string()),
            access_secret: Some("secret".to_string()),
            channel_id: Some("218772".to_string()),
            space_id: Some("15307".to_string()),
            author_id: Some("86563".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_publisher_requires_document_ids() {
        let config = PlatformConfig {
            access_key: Some("key".to_string()),
            access_secret: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(DocumentPublisher::new(&config).is_err());
        assert!(DocumentPublisher::new(&publishing_config()).is_ok());
    }

    #[test]
    fn test_document_url_composition() {
        let publisher = DocumentPublisher::new(&publishing_config()).unwrap();
        let url = publisher.document_url("a1", "r1");
        assert_eq!(
            url,
            "https://desk.channel.io/#/channels/218772/document/spaces/15307/articles/a1/revisions/r1?revisionFrom=all"
        );
    }
}
