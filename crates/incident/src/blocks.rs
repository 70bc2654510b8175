//! Block Kit layout types shared by messages and modals.

use serde::{Deserialize, Serialize};

/// A text object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    /// `mrkdwn` or `plain_text`
    #[serde(rename = "type")]
    pub text_type: String,
    /// Text content
    pub text: String,
    /// Whether emoji shortcodes are rendered (plain text only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
}

impl Text {
    /// Markdown text.
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            text_type: "mrkdwn".to_string(),
            text: text.into(),
            emoji: None,
        }
    }

    /// Plain text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text".to_string(),
            text: text.into(),
            emoji: None,
        }
    }

    /// Plain text with emoji rendering enabled.
    pub fn plain_emoji(text: impl Into<String>) -> Self {
        Self {
            emoji: Some(true),
            ..Self::plain(text)
        }
    }
}

/// Option of a static select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Label shown to the user
    pub text: Text,
    /// Value submitted
    pub value: String,
}

/// Interactive input element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// Free text input
    PlainTextInput {
        /// Identifier within the enclosing block
        action_id: String,
        /// Hint shown when empty
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Text>,
        /// Multi-line entry
        #[serde(default)]
        multiline: bool,
    },
    /// Single-select menu of fixed options
    StaticSelect {
        /// Identifier within the enclosing block
        action_id: String,
        /// Hint shown when nothing is selected
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Text>,
        /// Options to pick from
        options: Vec<SelectOption>,
    },
}

/// A layout block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Large bold heading
    Header {
        /// Heading text (plain text only)
        text: Text,
    },
    /// Text section
    Section {
        /// Section text
        text: Text,
    },
    /// Horizontal rule
    Divider,
    /// Labelled input on a modal
    Input {
        /// Identifier used to locate the value in submitted state
        block_id: String,
        /// Field label
        label: Text,
        /// Input element
        element: Element,
    },
}

impl Block {
    /// Header block with plain text.
    pub fn header(text: impl Into<String>) -> Self {
        Self::Header {
            text: Text::plain(text),
        }
    }

    /// Section block with markdown text.
    pub fn section(text: impl Into<String>) -> Self {
        Self::Section {
            text: Text::mrkdwn(text),
        }
    }

    /// Text of a header or section block.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Header { text } | Self::Section { text } => Some(text.text.as_str()),
            Self::Divider | Self::Input { .. } => None,
        }
    }
}
