//! Modal definitions for creating and resolving incidents, and parsing of their submissions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::blocks::{Block, Element, SelectOption, Text};
use crate::error::IncidentError;
use crate::model::{CreationRequest, Severity};

/// Callback id of the creation modal.
pub const CREATE_INCIDENT_CALLBACK: &str = "createIncidentView";

/// Callback id of the resolution confirmation modal.
pub const RESOLVE_INCIDENT_CALLBACK: &str = "resolveIncidentView";

const DESCRIPTION_BLOCK: &str = "internal_description";
const DESCRIPTION_ACTION: &str = "internal_description_input";
const SEVERITY_BLOCK: &str = "internal_severity";
const SEVERITY_ACTION: &str = "internal_severity_input";

/// A modal view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// Always `modal`
    #[serde(rename = "type")]
    pub view_type: String,
    /// Identifies the modal when it is submitted
    pub callback_id: String,
    /// Modal title
    pub title: Text,
    /// Body
    pub blocks: Vec<Block>,
    /// Submit button label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<Text>,
    /// Opaque data carried back on submission
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_metadata: String,
}

/// Typed data carried by the resolution modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveMetadata {
    /// Incident name (channel name without prefix)
    pub incident_name: String,
    /// Incident channel id
    pub channel_id: String,
}

/// Submitted input values keyed by block id, then action id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Values by block id and action id
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, InputValue>>,
}

/// A single submitted input value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputValue {
    /// Text input value
    #[serde(default)]
    pub value: Option<String>,
    /// Selected option of a select menu
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
}

/// Selected option of a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option value
    pub value: String,
}

impl ViewState {
    fn input(&self, block_id: &str, action_id: &str) -> Option<&InputValue> {
        self.values.get(block_id).and_then(|b| b.get(action_id))
    }
}

/// The creation modal: description and severity, both required.
#[must_use]
pub fn create_incident_view() -> View {
    let severity_options = Severity::ALL
        .iter()
        .map(|sev| SelectOption {
            text: Text::plain_emoji(format!("{}: {}", sev.as_str(), sev.impact())),
            value: sev.as_str().to_string(),
        })
        .collect();

    View {
        view_type: "modal".to_string(),
        callback_id: CREATE_INCIDENT_CALLBACK.to_string(),
        title: Text::plain("Create an incident"),
        blocks: vec![
            Block::Header {
                text: Text::plain_emoji("Internal details"),
            },
            Block::Input {
                block_id: DESCRIPTION_BLOCK.to_string(),
                label: Text::plain("Description"),
                element: Element::PlainTextInput {
                    action_id: DESCRIPTION_ACTION.to_string(),
                    placeholder: Some(Text::plain(
                        "Describe what's happening in a sentence or two",
                    )),
                    multiline: true,
                },
            },
            Block::Input {
                block_id: SEVERITY_BLOCK.to_string(),
                label: Text::plain_emoji("Severity"),
                element: Element::StaticSelect {
                    action_id: SEVERITY_ACTION.to_string(),
                    placeholder: Some(Text::plain_emoji("Select an item")),
                    options: severity_options,
                },
            },
        ],
        submit: Some(Text::plain("Submit")),
        private_metadata: String::new(),
    }
}

/// The resolution confirmation modal.
///
/// The channel id and incident name travel in `private_metadata` as JSON; the
/// rendered text is display only.
#[must_use]
pub fn resolve_incident_view(incident_name: &str, channel_id: &str) -> View {
    let metadata = ResolveMetadata {
        incident_name: incident_name.to_string(),
        channel_id: channel_id.to_string(),
    };

    View {
        view_type: "modal".to_string(),
        callback_id: RESOLVE_INCIDENT_CALLBACK.to_string(),
        title: Text::plain("Resolve an open incident"),
        blocks: vec![
            Block::section(format!(
                "*Incident name:* `{incident_name}`\n*Incident channel ID:* `{channel_id}`"
            )),
            Block::section(
                "Click \"submit\" below to mark the incident as resolved. \
                 The channel will stay open for any continued discussion.",
            ),
        ],
        submit: Some(Text::plain("Submit")),
        // Serializing two strings cannot fail.
        private_metadata: serde_json::to_string(&metadata).unwrap_or_default(),
    }
}

/// Interpret a submitted creation modal.
///
/// An absent description is treated as empty; a missing or unknown severity
/// is rejected.
pub fn parse_creation_submission(
    state: &ViewState,
    creator_id: &str,
) -> Result<CreationRequest, IncidentError> {
    let description = state
        .input(DESCRIPTION_BLOCK, DESCRIPTION_ACTION)
        .and_then(|v| v.value.clone())
        .unwrap_or_default();

    let severity = state
        .input(SEVERITY_BLOCK, SEVERITY_ACTION)
        .and_then(|v| v.selected_option.as_ref())
        .ok_or_else(|| IncidentError::InvalidSubmission("severity not selected".to_string()))?
        .value
        .parse::<Severity>()
        .map_err(IncidentError::InvalidSubmission)?;

    Ok(CreationRequest {
        description,
        severity,
        creator_id: creator_id.to_string(),
    })
}

/// Interpret the metadata carried by a submitted resolution modal.
pub fn parse_resolve_metadata(private_metadata: &str) -> Result<ResolveMetadata, IncidentError> {
    serde_json::from_str(private_metadata)
        .map_err(|e| IncidentError::InvalidSubmission(format!("resolution metadata: {e}")))
}
