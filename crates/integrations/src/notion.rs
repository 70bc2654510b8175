//! Notion API client for postmortem placeholder pages.

use async_trait::async_trait;
use incident::{CallError, DocumentPlatform, Platform, PostmortemPage};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NotionConfig;
use crate::error::ClientError;

/// Notion API base URL.
const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// Pinned API version.
const NOTION_VERSION: &str = "2022-06-28";

/// Icon placed on every postmortem page.
const PAGE_ICON: &str = "🤖";

/// Notion client bound to the postmortem database.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    database_id: String,
}

impl NotionClient {
    /// Create a new Notion client.
    ///
    /// # Errors
    /// Returns error if the integration token is not a valid header value.
    pub fn new(config: &NotionConfig) -> Result<Self, ClientError> {
        Self::with_base_url(config, NOTION_API_URL)
    }

    /// Create a client against a custom API URL (for testing).
    ///
    /// # Errors
    /// Returns error if the integration token is not a valid header value.
    pub fn with_base_url(config: &NotionConfig, base_url: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|_| ClientError::Setup("invalid Notion API key".to_string()))?,
        );
        headers.insert("notion-version", HeaderValue::from_static(NOTION_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            database_id: config.database_id.clone(),
        })
    }

    /// Create a page in the postmortem database.
    ///
    /// # Errors
    /// Returns error if the API request fails.
    pub async fn create_postmortem(&self, page: &PostmortemPage) -> Result<(), ClientError> {
        let request = CreatePage {
            parent: Parent {
                database_id: &self.database_id,
            },
            icon: Icon {
                icon_type: "emoji",
                emoji: PAGE_ICON,
            },
            properties: Properties {
                title: TitleProperty {
                    title: vec![RichText::new(&page.title)],
                },
                description: RichTextProperty {
                    rich_text: vec![RichText::new(&page.description)],
                },
                slack_url: UrlProperty {
                    url: &page.source_url,
                },
            },
        };

        debug!(title = %page.title, "Creating Notion postmortem page");

        let response = self
            .client
            .post(format!("{}/pages", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Notion API request failed");
            return Err(ClientError::Status { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentPlatform for NotionClient {
    async fn create_page(&self, page: &PostmortemPage) -> Result<(), CallError> {
        self.create_postmortem(page)
            .await
            .map_err(|e| e.into_call(Platform::Document, "pages.create"))
    }
}

#[derive(Debug, Serialize)]
struct CreatePage<'a> {
    parent: Parent<'a>,
    icon: Icon,
    properties: Properties<'a>,
}

#[derive(Debug, Serialize)]
struct Parent<'a> {
    database_id: &'a str,
}

#[derive(Debug, Serialize)]
struct Icon {
    #[serde(rename = "type")]
    icon_type: &'static str,
    emoji: &'static str,
}

#[derive(Debug, Serialize)]
struct Properties<'a> {
    title: TitleProperty<'a>,
    #[serde(rename = "Description")]
    description: RichTextProperty<'a>,
    #[serde(rename = "Slack URL")]
    slack_url: UrlProperty<'a>,
}

#[derive(Debug, Serialize)]
struct TitleProperty<'a> {
    title: Vec<RichText<'a>>,
}

#[derive(Debug, Serialize)]
struct RichTextProperty<'a> {
    rich_text: Vec<RichText<'a>>,
}

#[derive(Debug, Serialize)]
struct UrlProperty<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct RichText<'a> {
    text: TextContent<'a>,
}

impl<'a> RichText<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            text: TextContent { content },
        }
    }
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> NotionConfig {
        NotionConfig {
            api_key: "secret_abc".to_string(),
            database_id: "db-123".to_string(),
        }
    }

    fn page() -> PostmortemPage {
        PostmortemPage {
            title: "20240101-brave-otter".to_string(),
            description: "DB degraded".to_string(),
            source_url: "https://acme.slack.com/archives/C42".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_page_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .and(header("authorization", "Bearer secret_abc"))
            .and(header("notion-version", NOTION_VERSION))
            .and(body_json(json!({
                "parent": { "database_id": "db-123" },
                "icon": { "type": "emoji", "emoji": "🤖" },
                "properties": {
                    "title": { "title": [{ "text": { "content": "20240101-brave-otter" } }] },
                    "Description": { "rich_text": [{ "text": { "content": "DB degraded" } }] },
                    "Slack URL": { "url": "https://acme.slack.com/archives/C42" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "page", "id": "p1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url(&config(), &server.uri()).unwrap();
        client.create_page(&page()).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_page_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "object": "error",
                "code": "object_not_found"
            })))
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url(&config(), &server.uri()).unwrap();
        let err = client.create_page(&page()).await.unwrap_err();
        assert_eq!(err.platform, Platform::Document);
        assert_eq!(err.operation, "pages.create");
        assert!(err.message.contains("object_not_found"));
    }
}
