//! Error types for the incident workflow.

use std::fmt;

use thiserror::Error;

/// External platform a collaborator call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Group chat (Slack)
    Chat,
    /// On-call paging (`PagerDuty`)
    Paging,
    /// Document database (Notion)
    Document,
}

impl Platform {
    /// Short name used in logs and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Paging => "paging",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to an external platform failed.
#[derive(Debug, Clone, Error)]
#[error("{platform} platform call `{operation}` failed: {message}")]
pub struct CallError {
    /// Platform the call was made against
    pub platform: Platform,
    /// API operation (e.g. `conversations.create`)
    pub operation: String,
    /// Human-readable failure reason
    pub message: String,
}

impl CallError {
    /// Create a new call error.
    pub fn new(platform: Platform, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            platform,
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// User-facing precondition failures. The display text is shown to the invoking user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// Resolve command was invoked outside an incident channel
    #[error("*ERROR:* The `resolve-incident` command must be run from within an incident channel.")]
    NotIncidentChannel,

    /// Incident channel already carries the resolved suffix
    #[error("*ERROR:* The incident is already resolved.")]
    AlreadyResolved,
}

/// One failed operation inside a fan-out.
#[derive(Debug, Clone)]
pub struct OperationFailure {
    /// Label the operation was registered under
    pub label: String,
    /// Underlying call error
    pub error: CallError,
}

/// Aggregate failure of a fan-out: at least one operation failed.
///
/// Operations that succeeded keep their side effects.
#[derive(Debug, Clone, Error)]
#[error("{} of {total} operations failed: {}", .failures.len(), describe(.failures))]
pub struct FanOutError {
    /// Number of operations issued
    pub total: usize,
    /// Operations that failed, in registration order
    pub failures: Vec<OperationFailure>,
}

impl FanOutError {
    /// Labels of the failed operations.
    #[must_use]
    pub fn failed_labels(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.label.as_str()).collect()
    }
}

fn describe(failures: &[OperationFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.label, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors returned by the [`Coordinator`](crate::Coordinator).
#[derive(Debug, Error)]
pub enum IncidentError {
    /// Invocation was rejected before any side effect
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// A sequential collaborator call failed
    #[error(transparent)]
    Call(#[from] CallError),

    /// One or more fan-out operations failed
    #[error(transparent)]
    FanOut(#[from] FanOutError),

    /// Form submission could not be interpreted
    #[error("Invalid form submission: {0}")]
    InvalidSubmission(String),
}

impl IncidentError {
    /// Message to show the invoking user, if this error is user-facing.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Precondition(e) => Some(e.to_string()),
            _ => None,
        }
    }
}
