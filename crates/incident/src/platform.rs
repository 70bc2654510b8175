//! Interfaces to the external platforms the workflow drives.
//!
//! The chat platform is mandatory. Paging and documents are optional
//! capabilities: the [`Coordinator`](crate::Coordinator) skips them when no
//! implementation is supplied.

use async_trait::async_trait;

use crate::blocks::Block;
use crate::error::CallError;
use crate::views::View;

/// Channel identity as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel id
    pub id: String,
    /// Current channel name
    pub name: String,
}

/// A message to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Channel id, or a user id for a direct message
    pub channel: String,
    /// Fallback text (notifications, clients without block support)
    pub text: String,
    /// Rich layout; empty for plain text messages
    pub blocks: Vec<Block>,
}

impl OutgoingMessage {
    /// Plain text message.
    pub fn text(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks: Vec::new(),
        }
    }

    /// Block message with fallback text.
    pub fn blocks(channel: impl Into<String>, text: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks,
        }
    }
}

/// Group chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Open a modal in response to a command or interaction trigger.
    async fn open_view(&self, trigger_id: &str, view: &View) -> Result<(), CallError>;

    /// Create a public channel.
    async fn create_channel(&self, name: &str) -> Result<ChannelInfo, CallError>;

    /// Set a channel's topic.
    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<(), CallError>;

    /// Add a link bookmark to a channel.
    async fn add_bookmark(&self, channel_id: &str, title: &str, link: &str)
        -> Result<(), CallError>;

    /// Post a message.
    async fn post_message(&self, message: &OutgoingMessage) -> Result<(), CallError>;

    /// Invite a user to a channel.
    async fn invite_user(&self, channel_id: &str, user_id: &str) -> Result<(), CallError>;

    /// Rename a channel.
    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), CallError>;

    /// Fetch a channel's current name.
    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, CallError>;
}

/// Request to page on-call responders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Incident title
    pub title: String,
    /// Body details, referencing the discussion channel
    pub details: String,
}

/// Paging incident that was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Paging platform incident id
    pub id: String,
    /// Web link to the incident
    pub html_url: String,
}

/// On-call paging platform.
#[async_trait]
pub trait PagingPlatform: Send + Sync {
    /// Open a paging incident.
    async fn create_incident(&self, request: &PageRequest) -> Result<PageResult, CallError>;
}

/// Postmortem placeholder page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostmortemPage {
    /// Page title (the incident name)
    pub title: String,
    /// Incident description
    pub description: String,
    /// Link back to the incident channel
    pub source_url: String,
}

/// Document database platform.
#[async_trait]
pub trait DocumentPlatform: Send + Sync {
    /// Create a page in the postmortem database.
    async fn create_page(&self, page: &PostmortemPage) -> Result<(), CallError>;
}
