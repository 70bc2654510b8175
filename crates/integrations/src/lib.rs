//! Platform adapters and HTTP service for the incident manager.
//!
//! This crate provides:
//! - Slack Web API client implementing [`incident::ChatPlatform`]
//! - `PagerDuty` REST client implementing [`incident::PagingPlatform`]
//! - Notion client implementing [`incident::DocumentPlatform`]
//! - Slack request signature verification and payload parsing
//! - Environment configuration
//! - HTTP server for slash commands and interactions (standalone service)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Many async API methods can fail

pub mod config;
pub mod error;
pub mod notion;
pub mod pagerduty;
pub mod server;
pub mod slack;
pub mod webhooks;

use std::sync::Arc;

use incident::Collaborators;
use tracing::info;

pub use config::{Config, ConfigError, NotionConfig, PagerDutyConfig};
pub use error::ClientError;
pub use notion::NotionClient;
pub use pagerduty::PagerDutyClient;
pub use slack::SlackClient;
pub use webhooks::{sign_request, verify_slack_signature};

/// Build the platform clients enabled by `config`.
pub fn collaborators(config: &Config) -> Result<Collaborators, ClientError> {
    let mut collaborators = Collaborators::chat_only(Arc::new(SlackClient::new(&config.slack_token)?));

    if let Some(pagerduty) = &config.pagerduty {
        info!("PagerDuty paging enabled");
        collaborators = collaborators.with_paging(Arc::new(PagerDutyClient::new(pagerduty)?));
    } else {
        info!("No PAGERDUTY_API_TOKEN configured - paging disabled");
    }

    if let Some(notion) = &config.notion {
        info!("Notion postmortem pages enabled");
        collaborators = collaborators.with_documents(Arc::new(NotionClient::new(notion)?));
    } else {
        info!("No NOTION_API_KEY configured - postmortem pages disabled");
    }

    Ok(collaborators)
}
