//! Slack Web API client.
//!
//! Implements [`ChatPlatform`] over the handful of Web API methods the
//! incident workflow needs. Slack reports most failures as HTTP 200 with
//! `"ok": false`; those are surfaced as [`ClientError::Slack`].

use async_trait::async_trait;
use incident::blocks::Block;
use incident::views::View;
use incident::{CallError, ChannelInfo, ChatPlatform, OutgoingMessage, Platform};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Slack Web API base URL.
const SLACK_API_URL: &str = "https://slack.com/api";

/// Slack Web API client authenticated with a bot token.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    base_url: String,
}

impl SlackClient {
    /// Create a new client with a bot token.
    ///
    /// # Errors
    /// Returns error if the token is not a valid header value.
    pub fn new(bot_token: &str) -> Result<Self, ClientError> {
        Self::with_base_url(bot_token, SLACK_API_URL)
    }

    /// Create a client against a custom API URL (for testing).
    ///
    /// # Errors
    /// Returns error if the token is not a valid header value.
    pub fn with_base_url(bot_token: &str, base_url: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {bot_token}"))
                .map_err(|_| ClientError::Setup("invalid Slack token".to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Call a Web API method with a JSON body.
    async fn call<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        debug!(method, "Calling Slack API");
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    /// Call a Web API method with a form-encoded body (read methods reject JSON).
    async fn call_form<R: DeserializeOwned>(
        &self,
        method: &str,
        form: &[(&str, &str)],
    ) -> Result<R, ClientError> {
        debug!(method, "Calling Slack API");
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .form(form)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    async fn decode<R: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<R, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method, status = %status, body = %body, "Slack API request failed");
            return Err(ClientError::Status { status, body });
        }

        let envelope: Value = response.json().await?;
        if envelope.get("ok").and_then(Value::as_bool) != Some(true) {
            let error = envelope
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error")
                .to_string();
            warn!(method, error = %error, "Slack API returned an error");
            return Err(ClientError::Slack(error));
        }

        Ok(serde_json::from_value(envelope)?)
    }

    // =========================================================================
    // Web API methods
    // =========================================================================

    /// `views.open`
    pub async fn open_view(&self, trigger_id: &str, view: &View) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .call("views.open", &ViewsOpen { trigger_id, view })
            .await?;
        Ok(())
    }

    /// `conversations.create`
    pub async fn create_channel(&self, name: &str) -> Result<SlackChannel, ClientError> {
        let response: ChannelResponse = self
            .call("conversations.create", &ConversationsCreate { name })
            .await?;
        Ok(response.channel)
    }

    /// `conversations.setTopic`
    pub async fn set_topic(&self, channel: &str, topic: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .call("conversations.setTopic", &SetTopic { channel, topic })
            .await?;
        Ok(())
    }

    /// `bookmarks.add` (link bookmark)
    pub async fn add_bookmark(
        &self,
        channel_id: &str,
        title: &str,
        link: &str,
    ) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .call(
                "bookmarks.add",
                &BookmarksAdd {
                    channel_id,
                    title,
                    bookmark_type: "link",
                    link,
                },
            )
            .await?;
        Ok(())
    }

    /// `chat.postMessage`
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: &[Block],
    ) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .call(
                "chat.postMessage",
                &PostMessage {
                    channel,
                    text,
                    blocks,
                },
            )
            .await?;
        Ok(())
    }

    /// `conversations.invite`
    pub async fn invite(&self, channel: &str, users: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .call("conversations.invite", &ConversationsInvite { channel, users })
            .await?;
        Ok(())
    }

    /// `conversations.rename`
    pub async fn rename(&self, channel: &str, name: &str) -> Result<(), ClientError> {
        let _: IgnoredAny = self
            .call("conversations.rename", &ConversationsRename { channel, name })
            .await?;
        Ok(())
    }

    /// `conversations.info`
    pub async fn channel_info(&self, channel: &str) -> Result<SlackChannel, ClientError> {
        let response: ChannelResponse = self
            .call_form("conversations.info", &[("channel", channel)])
            .await?;
        Ok(response.channel)
    }
}

fn chat_error(operation: &str) -> impl FnOnce(ClientError) -> CallError + '_ {
    move |e| e.into_call(Platform::Chat, operation)
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn open_view(&self, trigger_id: &str, view: &View) -> Result<(), CallError> {
        SlackClient::open_view(self, trigger_id, view)
            .await
            .map_err(chat_error("views.open"))
    }

    async fn create_channel(&self, name: &str) -> Result<ChannelInfo, CallError> {
        let channel = SlackClient::create_channel(self, name)
            .await
            .map_err(chat_error("conversations.create"))?;
        Ok(channel.into())
    }

    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<(), CallError> {
        SlackClient::set_topic(self, channel_id, topic)
            .await
            .map_err(chat_error("conversations.setTopic"))
    }

    async fn add_bookmark(
        &self,
        channel_id: &str,
        title: &str,
        link: &str,
    ) -> Result<(), CallError> {
        SlackClient::add_bookmark(self, channel_id, title, link)
            .await
            .map_err(chat_error("bookmarks.add"))
    }

    async fn post_message(&self, message: &OutgoingMessage) -> Result<(), CallError> {
        SlackClient::post_message(self, &message.channel, &message.text, &message.blocks)
            .await
            .map_err(chat_error("chat.postMessage"))
    }

    async fn invite_user(&self, channel_id: &str, user_id: &str) -> Result<(), CallError> {
        self.invite(channel_id, user_id)
            .await
            .map_err(chat_error("conversations.invite"))
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), CallError> {
        self.rename(channel_id, name)
            .await
            .map_err(chat_error("conversations.rename"))
    }

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, CallError> {
        let channel = SlackClient::channel_info(self, channel_id)
            .await
            .map_err(chat_error("conversations.info"))?;
        Ok(channel.into())
    }
}

// =============================================================================
// Slack API types
// =============================================================================

/// Channel object returned by `conversations.*` methods.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackChannel {
    /// Channel id
    pub id: String,
    /// Channel name
    pub name: String,
}

impl From<SlackChannel> for ChannelInfo {
    fn from(channel: SlackChannel) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    channel: SlackChannel,
}

#[derive(Debug, Serialize)]
struct ViewsOpen<'a> {
    trigger_id: &'a str,
    view: &'a View,
}

#[derive(Debug, Serialize)]
struct ConversationsCreate<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SetTopic<'a> {
    channel: &'a str,
    topic: &'a str,
}

#[derive(Debug, Serialize)]
struct BookmarksAdd<'a> {
    channel_id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    bookmark_type: &'static str,
    link: &'a str,
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "no_blocks")]
    blocks: &'a [Block],
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_blocks(blocks: &&[Block]) -> bool {
    blocks.is_empty()
}

#[derive(Debug, Serialize)]
struct ConversationsInvite<'a> {
    channel: &'a str,
    users: &'a str,
}

#[derive(Debug, Serialize)]
struct ConversationsRename<'a> {
    channel: &'a str,
    name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident::messages;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> SlackClient {
        SlackClient::with_base_url("xoxb-test", &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_create_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversations.create"))
            .and(header("authorization", "Bearer xoxb-test"))
            .and(body_partial_json(json!({ "name": "incd-20240101-brave-otter" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "channel": { "id": "C123", "name": "incd-20240101-brave-otter", "is_channel": true }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = ChatPlatform::create_channel(&client(&server).await, "incd-20240101-brave-otter")
            .await
            .unwrap();
        assert_eq!(channel.id, "C123");
        assert_eq!(channel.name, "incd-20240101-brave-otter");
    }

    #[tokio::test]
    async fn test_ok_false_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversations.create"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "name_taken" })),
            )
            .mount(&server)
            .await;

        let err = ChatPlatform::create_channel(&client(&server).await, "incd-x")
            .await
            .unwrap_err();
        assert_eq!(err.platform, Platform::Chat);
        assert_eq!(err.operation, "conversations.create");
        assert_eq!(err.message, "name_taken");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let message = OutgoingMessage::text("C1", "hello");
        let err = ChatPlatform::post_message(&client(&server).await, &message)
            .await
            .unwrap_err();
        assert!(err.message.contains("500"));
    }

    #[tokio::test]
    async fn test_post_message_with_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(json!({
                "channel": "C1",
                "text": "Resolved incident x",
                "blocks": [{ "type": "header" }, { "type": "section" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "ts": "1.2" })))
            .expect(1)
            .mount(&server)
            .await;

        let message = OutgoingMessage::blocks(
            "C1",
            "Resolved incident x",
            messages::incident_resolved_notify_blocks("C9"),
        );
        ChatPlatform::post_message(&client(&server).await, &message)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bookmark_is_a_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bookmarks.add"))
            .and(body_partial_json(json!({
                "channel_id": "C1",
                "title": "Incident documentation",
                "type": "link",
                "link": "https://docs.example.com"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        ChatPlatform::add_bookmark(
            &client(&server).await,
            "C1",
            "Incident documentation",
            "https://docs.example.com",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_channel_info_is_form_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversations.info"))
            .and(body_string_contains("channel=C77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "channel": { "id": "C77", "name": "incd-20240101-brave-otter" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let info = ChatPlatform::channel_info(&client(&server).await, "C77")
            .await
            .unwrap();
        assert_eq!(info.name, "incd-20240101-brave-otter");
    }

    #[tokio::test]
    async fn test_open_view_sends_trigger_and_view() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/views.open"))
            .and(body_partial_json(json!({
                "trigger_id": "T-1",
                "view": { "type": "modal", "callback_id": "createIncidentView" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "view": {} })))
            .expect(1)
            .mount(&server)
            .await;

        ChatPlatform::open_view(
            &client(&server).await,
            "T-1",
            &incident::views::create_incident_view(),
        )
        .await
        .unwrap();
    }
}
