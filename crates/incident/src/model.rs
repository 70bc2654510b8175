//! Incident domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Incident severity levels offered on the creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Product is unusable for most users
    #[serde(rename = "SEV0")]
    Sev0,
    /// Product is unusable for some users or degraded for most
    #[serde(rename = "SEV1")]
    Sev1,
    /// Product is degraded for some users but still usable for most
    #[serde(rename = "SEV2")]
    Sev2,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Self; 3] = [Self::Sev0, Self::Sev1, Self::Sev2];

    /// Wire and display tag (`SEV0`, `SEV1`, `SEV2`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sev0 => "SEV0",
            Self::Sev1 => "SEV1",
            Self::Sev2 => "SEV2",
        }
    }

    /// Impact statement shown next to the tag in the severity picker.
    #[must_use]
    pub const fn impact(&self) -> &'static str {
        match self {
            Self::Sev0 => "Product is unusable for most users",
            Self::Sev1 => "Product is unusable for some users or degraded for most",
            Self::Sev2 => "Product is degraded for some users but still usable for most",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown severity: {s}"))
    }
}

/// Filled-in creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    /// Free-text description (may be empty)
    pub description: String,
    /// Selected severity
    pub severity: Severity,
    /// User who submitted the form
    pub creator_id: String,
}

/// Resolve command invocation, as received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTrigger {
    /// Handle for opening a modal in response
    pub trigger_id: String,
    /// Channel the command was run in
    pub channel_id: String,
    /// Name of that channel
    pub channel_name: String,
}
