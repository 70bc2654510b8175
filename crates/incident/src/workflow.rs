//! Incident workflow coordinator.
//!
//! Sequences the creation and resolution of incidents across the chat,
//! paging and document platforms.
//!
//! ## Creation
//!
//! ```text
//! name ─► create channel ─► [page on-call] ─► summary ─► fan-out ─► CreatedIncident
//!            (fatal)           (fatal)                   (aggregate failure)
//! ```
//!
//! ## Resolution
//!
//! ```text
//! preconditions ─► confirmation modal
//! submit ─► channel info ─► rename ─► fan-out ─► ResolvedIncident
//! ```
//!
//! No step is retried and nothing is rolled back: a failure after the channel
//! exists leaves the channel (and any completed fan-out effects) in place.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{IncidentError, PreconditionError};
use crate::fanout::FanOut;
use crate::messages::{self, SummaryFields};
use crate::model::{CreationRequest, ResolutionTrigger, Severity};
use crate::naming::IncidentName;
use crate::platform::{
    ChatPlatform, DocumentPlatform, OutgoingMessage, PageRequest, PagingPlatform, PostmortemPage,
};
use crate::views;
use crate::{DEFAULT_CHANNEL_PREFIX, RESOLVED_SUFFIX};

/// Title of the documentation bookmark added to every incident channel.
const BOOKMARK_TITLE: &str = "Incident documentation";

/// Static workflow settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Prefix for incident channel names
    pub channel_prefix: String,
    /// Link bookmarked in every incident channel
    pub incident_doc_url: String,
    /// Chat workspace subdomain, used for channel archive links
    pub chat_org: String,
    /// Users invited to every incident channel
    pub invite_user_ids: Vec<String>,
    /// Channels that receive creation and resolution broadcasts
    pub notify_channel_ids: Vec<String>,
    /// User groups mentioned in the incident summary
    pub cc_group_ids: Vec<String>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
            incident_doc_url: String::new(),
            chat_org: String::new(),
            invite_user_ids: Vec::new(),
            notify_channel_ids: Vec::new(),
            cc_group_ids: Vec::new(),
        }
    }
}

impl WorkflowSettings {
    /// Archive link for a channel in the chat workspace.
    #[must_use]
    pub fn channel_url(&self, channel_id: &str) -> String {
        format!("https://{}.slack.com/archives/{channel_id}", self.chat_org)
    }
}

/// Platforms available to the coordinator.
///
/// `paging` and `documents` are optional capabilities; when absent the
/// corresponding steps are skipped.
#[derive(Clone)]
pub struct Collaborators {
    /// Chat platform
    pub chat: Arc<dyn ChatPlatform>,
    /// On-call paging platform
    pub paging: Option<Arc<dyn PagingPlatform>>,
    /// Postmortem document platform
    pub documents: Option<Arc<dyn DocumentPlatform>>,
}

impl Collaborators {
    /// Chat only; paging and documents disabled.
    #[must_use]
    pub fn chat_only(chat: Arc<dyn ChatPlatform>) -> Self {
        Self {
            chat,
            paging: None,
            documents: None,
        }
    }

    /// Enable paging.
    #[must_use]
    pub fn with_paging(mut self, paging: Arc<dyn PagingPlatform>) -> Self {
        self.paging = Some(paging);
        self
    }

    /// Enable postmortem documents.
    #[must_use]
    pub fn with_documents(mut self, documents: Arc<dyn DocumentPlatform>) -> Self {
        self.documents = Some(documents);
        self
    }
}

/// Outcome of a successful creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIncident {
    /// Generated incident name
    pub name: String,
    /// Name of the incident channel
    pub channel_name: String,
    /// Id of the incident channel
    pub channel_id: String,
    /// Declared severity
    pub severity: Severity,
    /// Paging incident link, when paging is enabled
    pub paging_url: Option<String>,
    /// Number of fan-out operations performed
    pub operations: usize,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIncident {
    /// Incident channel id
    pub channel_id: String,
    /// Channel name after the rename
    pub channel_name: String,
}

/// Drives incident creation and resolution.
pub struct Coordinator {
    settings: WorkflowSettings,
    collaborators: Collaborators,
    name_source: Box<dyn Fn() -> IncidentName + Send + Sync>,
}

impl Coordinator {
    /// Create a coordinator that names incidents with [`IncidentName::generate`].
    #[must_use]
    pub fn new(settings: WorkflowSettings, collaborators: Collaborators) -> Self {
        Self {
            settings,
            collaborators,
            name_source: Box::new(IncidentName::generate),
        }
    }

    /// Replace the incident name source.
    #[must_use]
    pub fn with_name_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> IncidentName + Send + Sync + 'static,
    {
        self.name_source = Box::new(source);
        self
    }

    /// Workflow settings.
    #[must_use]
    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Whether on-call paging is enabled.
    #[must_use]
    pub fn paging_enabled(&self) -> bool {
        self.collaborators.paging.is_some()
    }

    /// Whether postmortem documents are enabled.
    #[must_use]
    pub fn documents_enabled(&self) -> bool {
        self.collaborators.documents.is_some()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Open the incident creation form.
    pub async fn open_creation_form(&self, trigger_id: &str) -> Result<(), IncidentError> {
        debug!("Opening incident creation form");
        self.collaborators
            .chat
            .open_view(trigger_id, &views::create_incident_view())
            .await?;
        Ok(())
    }

    /// Create an incident from a submitted creation form.
    #[instrument(skip(self, request), fields(creator_id = %request.creator_id, severity = %request.severity))]
    pub async fn create_incident(
        &self,
        request: &CreationRequest,
    ) -> Result<CreatedIncident, IncidentError> {
        let chat = &self.collaborators.chat;
        let settings = &self.settings;

        let name = (self.name_source)();
        let channel_name = name.channel_name(&settings.channel_prefix);

        info!(channel_name = %channel_name, "Setting up incident channel");
        let channel = chat.create_channel(&channel_name).await?;
        let channel_id = channel.id.as_str();

        let paging_url = match &self.collaborators.paging {
            Some(paging) => {
                info!(channel_id = %channel_id, "Creating paging incident");
                let page = paging
                    .create_incident(&PageRequest {
                        title: format!("{name} ({})", request.description),
                        details: format!(
                            "An incident has been filed via the incident-manager tool: {}. \
                             Go to the discussion in https://slack.com/app_redirect?channel={channel_id}.",
                            request.description
                        ),
                    })
                    .await?;
                Some(page.html_url)
            }
            None => None,
        };

        let summary = messages::summary(
            &SummaryFields {
                name: name.as_str(),
                description: &request.description,
                severity: request.severity,
                channel_id,
                creator_id: &request.creator_id,
                paging_url: paging_url.as_deref(),
            },
            &settings.cc_group_ids,
        );
        let fallback = messages::created_text(name.as_str());

        let mut fan_out = FanOut::new();

        fan_out.push("set topic", chat.set_topic(channel_id, &request.description));
        fan_out.push(
            "add documentation bookmark",
            chat.add_bookmark(channel_id, BOOKMARK_TITLE, &settings.incident_doc_url),
        );

        let in_channel = OutgoingMessage::blocks(
            channel_id,
            fallback.clone(),
            messages::incident_created_blocks(&summary),
        );
        fan_out.push("post incident summary", async move {
            chat.post_message(&in_channel).await
        });

        fan_out.push(
            format!("invite creator {}", request.creator_id),
            chat.invite_user(channel_id, &request.creator_id),
        );
        for user_id in &settings.invite_user_ids {
            if user_id.is_empty() || *user_id == request.creator_id {
                continue;
            }
            fan_out.push(format!("invite {user_id}"), chat.invite_user(channel_id, user_id));
        }

        for notify_channel in &settings.notify_channel_ids {
            let broadcast = OutgoingMessage::blocks(
                notify_channel.as_str(),
                fallback.clone(),
                messages::incident_created_notify_blocks(&summary),
            );
            fan_out.push(format!("notify {notify_channel}"), async move {
                chat.post_message(&broadcast).await
            });
        }

        let dm = OutgoingMessage::text(
            request.creator_id.as_str(),
            messages::creator_dm_text(channel_id),
        );
        fan_out.push("message creator", async move { chat.post_message(&dm).await });

        if let Some(documents) = &self.collaborators.documents {
            let page = PostmortemPage {
                title: name.to_string(),
                description: request.description.clone(),
                source_url: settings.channel_url(channel_id),
            };
            fan_out.push("create postmortem page", async move {
                documents.create_page(&page).await
            });
        }

        let operations = fan_out.join().await?;

        info!(
            incident = %name,
            channel_id = %channel_id,
            operations,
            "Incident successfully created"
        );

        Ok(CreatedIncident {
            name: name.to_string(),
            channel_name,
            channel_id: channel.id.clone(),
            severity: request.severity,
            paging_url,
            operations,
        })
    }

    /// Send a plain direct message to a user.
    pub async fn message_user(&self, user_id: &str, text: &str) -> Result<(), IncidentError> {
        self.collaborators
            .chat
            .post_message(&OutgoingMessage::text(user_id, text))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Validate that a channel can be resolved and return its incident name.
    pub fn check_resolvable(&self, channel_name: &str) -> Result<IncidentName, PreconditionError> {
        let name = IncidentName::from_channel_name(&self.settings.channel_prefix, channel_name)
            .ok_or(PreconditionError::NotIncidentChannel)?;
        if channel_name.ends_with(RESOLVED_SUFFIX) {
            return Err(PreconditionError::AlreadyResolved);
        }
        Ok(name)
    }

    /// Handle the resolve command: check preconditions and open the confirmation form.
    #[instrument(skip(self, trigger), fields(channel_id = %trigger.channel_id, channel_name = %trigger.channel_name))]
    pub async fn request_resolution(&self, trigger: &ResolutionTrigger) -> Result<(), IncidentError> {
        let name = self.check_resolvable(&trigger.channel_name)?;

        debug!(incident = %name, "Opening resolution form");
        self.collaborators
            .chat
            .open_view(
                &trigger.trigger_id,
                &views::resolve_incident_view(name.as_str(), &trigger.channel_id),
            )
            .await?;
        Ok(())
    }

    /// Resolve the incident owning `channel_id`: rename its channel and announce.
    #[instrument(skip(self))]
    pub async fn resolve_incident(&self, channel_id: &str) -> Result<ResolvedIncident, IncidentError> {
        let chat = &self.collaborators.chat;

        let channel = chat.channel_info(channel_id).await?;
        if channel.name.ends_with(RESOLVED_SUFFIX) {
            return Err(PreconditionError::AlreadyResolved.into());
        }

        let resolved_name = format!("{}{RESOLVED_SUFFIX}", channel.name);
        info!(from = %channel.name, to = %resolved_name, "Renaming incident channel");
        chat.rename_channel(channel_id, &resolved_name).await?;

        let incident_name =
            IncidentName::from_channel_name(&self.settings.channel_prefix, &channel.name)
                .map_or_else(|| channel.name.clone(), |n| n.to_string());
        let fallback = messages::resolved_text(&incident_name);

        let mut fan_out = FanOut::new();
        for notify_channel in &self.settings.notify_channel_ids {
            let broadcast = OutgoingMessage::blocks(
                notify_channel.as_str(),
                fallback.clone(),
                messages::incident_resolved_notify_blocks(channel_id),
            );
            fan_out.push(format!("notify {notify_channel}"), async move {
                chat.post_message(&broadcast).await
            });
        }
        let notice =
            OutgoingMessage::blocks(channel_id, fallback, messages::incident_resolved_blocks());
        fan_out.push("post resolution notice", async move {
            chat.post_message(&notice).await
        });

        fan_out.join().await?;

        info!(channel_id = %channel_id, "Incident successfully resolved");

        Ok(ResolvedIncident {
            channel_id: channel_id.to_string(),
            channel_name: resolved_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> WorkflowSettings {
        WorkflowSettings {
            chat_org: "acme".to_string(),
            ..WorkflowSettings::default()
        }
    }

    #[test]
    fn test_channel_url() {
        assert_eq!(
            settings().channel_url("C42"),
            "https://acme.slack.com/archives/C42"
        );
    }

    #[test]
    fn test_default_prefix() {
        assert_eq!(WorkflowSettings::default().channel_prefix, "incd-");
    }
}
