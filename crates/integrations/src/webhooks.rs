//! Slack request payload parsing and signature verification.

use hmac::{Hmac, Mac};
use incident::views::ViewState;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Slack signature scheme version.
const SIGNATURE_VERSION: &str = "v0";

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Header carrying the request timestamp (Unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Compute the `v0=…` signature Slack attaches to a request.
///
/// Returns `None` only if the secret cannot key an HMAC.
#[must_use]
pub fn sign_request(secret: &str, timestamp: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Some(format!(
        "{SIGNATURE_VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Verify a Slack request signature using HMAC-SHA256.
///
/// # Arguments
/// * `body` - Raw request body bytes
/// * `timestamp` - Value of `X-Slack-Request-Timestamp`
/// * `signature` - Value of `X-Slack-Signature` (`v0=` + hex digest)
/// * `secret` - Signing secret
#[must_use]
pub fn verify_slack_signature(body: &[u8], timestamp: &str, signature: &str, secret: &str) -> bool {
    let Some(hex_digest) = signature
        .strip_prefix(SIGNATURE_VERSION)
        .and_then(|s| s.strip_prefix('='))
    else {
        return false;
    };
    let Ok(signature_bytes) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    computed.as_slice().ct_eq(&signature_bytes).into()
}

/// Validate that a request timestamp (Unix seconds) is within `max_age_secs` of now.
#[must_use]
pub fn validate_request_timestamp(timestamp: &str, max_age_secs: i64) -> bool {
    let Ok(timestamp) = timestamp.trim().parse::<i64>() else {
        return false;
    };
    let now = chrono::Utc::now().timestamp();
    now.abs_diff(timestamp) <= max_age_secs.unsigned_abs()
}

/// Slash command invocation (form-encoded).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlashCommand {
    /// Command name, including the leading slash
    pub command: String,
    /// Trigger for opening a modal
    #[serde(default)]
    pub trigger_id: String,
    /// Invoking channel id
    #[serde(default)]
    pub channel_id: String,
    /// Invoking channel name
    #[serde(default)]
    pub channel_name: String,
    /// Invoking user id
    #[serde(default)]
    pub user_id: String,
}

/// Interaction request body: a form with a single JSON `payload` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEnvelope {
    /// JSON-encoded [`InteractionPayload`]
    pub payload: String,
}

/// Interaction payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    /// A modal was submitted
    ViewSubmission {
        /// Submitting user
        user: InteractionUser,
        /// Submitted view
        view: SubmittedView,
    },
    /// Any other interaction (ignored)
    #[serde(other)]
    Unknown,
}

/// User attached to an interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionUser {
    /// User id
    pub id: String,
}

/// View as carried by a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedView {
    /// Callback id of the modal
    pub callback_id: String,
    /// Data attached when the modal was opened
    #[serde(default)]
    pub private_metadata: String,
    /// Submitted values
    #[serde(default)]
    pub state: ViewState,
}
