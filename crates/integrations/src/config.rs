//! Configuration for the incident manager service.
//!
//! Read once at startup from the environment. Optional integrations are
//! enabled by the presence of their credentials.

use std::env;

use incident::{WorkflowSettings, DEFAULT_CHANNEL_PREFIX};
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_REQUEST_AGE_SECS: i64 = 300;

/// Configuration errors raised at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable could not be parsed
    #[error("{name} has an invalid value `{value}`")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// `PagerDuty` credentials and references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerDutyConfig {
    /// REST API token
    pub api_token: String,
    /// Service incidents are opened against
    pub service_id: String,
    /// Escalation policy to page
    pub escalation_policy_id: String,
    /// Requester email sent in the `From` header
    pub from_email: String,
}

/// Notion credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionConfig {
    /// Integration token
    pub api_key: String,
    /// Postmortem database id
    pub database_id: String,
}

/// Service configuration.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Slack bot token.
    pub slack_token: String,
    /// Slack request signing secret.
    pub signing_secret: String,
    /// Maximum age of a signed Slack request, in seconds.
    pub max_request_age_secs: i64,
    /// Slack workspace subdomain; empty unless postmortem pages are enabled.
    pub slack_org: String,
    /// Users invited to every incident channel.
    pub invite_user_ids: Vec<String>,
    /// Channels receiving incident broadcasts.
    pub notify_channel_ids: Vec<String>,
    /// User groups CC'd in the incident summary.
    pub cc_group_ids: Vec<String>,
    /// Incident channel prefix.
    pub channel_prefix: String,
    /// Documentation link bookmarked in incident channels.
    pub incident_doc_url: String,
    /// Paging integration, when configured.
    pub pagerduty: Option<PagerDutyConfig>,
    /// Postmortem integration, when configured.
    pub notion: Option<NotionConfig>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("slack_org", &self.slack_org)
            .field("channel_prefix", &self.channel_prefix)
            .field("notify_channel_ids", &self.notify_channel_ids)
            .field("pagerduty", &self.pagerduty.is_some())
            .field("notion", &self.notion.is_some())
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
        let list = |name: &str| {
            var(name)
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        };

        let port = match var("INCIDENT_MANAGER_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "INCIDENT_MANAGER_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let max_request_age_secs = match var("SLACK_MAX_REQUEST_AGE_SECS") {
            Some(value) => match value.parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SLACK_MAX_REQUEST_AGE_SECS",
                        value,
                    })
                }
            },
            None => DEFAULT_MAX_REQUEST_AGE_SECS,
        };

        let pagerduty = match var("PAGERDUTY_API_TOKEN") {
            Some(api_token) => Some(PagerDutyConfig {
                api_token,
                service_id: required("PAGERDUTY_SERVICE_ID")?,
                escalation_policy_id: required("PAGERDUTY_ESCALATION_POLICY_ID")?,
                from_email: required("PAGERDUTY_FROM_EMAIL")?,
            }),
            None => None,
        };

        let notion = match var("NOTION_API_KEY") {
            Some(api_key) => Some(NotionConfig {
                api_key,
                database_id: required("NOTION_DB_ID")?,
            }),
            None => None,
        };

        // Postmortem pages link back to the channel archive in this workspace.
        let slack_org = match (&notion, var("SLACK_ORG")) {
            (_, Some(org)) => org,
            (Some(_), None) => return Err(ConfigError::Missing("SLACK_ORG")),
            (None, None) => String::new(),
        };

        Ok(Self {
            port,
            slack_token: required("SLACK_API_TOKEN")?,
            signing_secret: required("SLACK_SIGNING_SECRET")?,
            incident_doc_url: required("INCIDENT_DOC_URL")?,
            max_request_age_secs,
            slack_org,
            invite_user_ids: list("SLACK_INVITE_USERS"),
            notify_channel_ids: list("SLACK_NOTIFY_CHANNEL_IDS"),
            cc_group_ids: list("SLACK_CC_GROUP_IDS"),
            channel_prefix: var("INCIDENT_CHANNEL_PREFIX")
                .unwrap_or_else(|| DEFAULT_CHANNEL_PREFIX.to_string()),
            pagerduty,
            notion,
        })
    }

    /// Workflow settings derived from this configuration.
    #[must_use]
    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            channel_prefix: self.channel_prefix.clone(),
            incident_doc_url: self.incident_doc_url.clone(),
            chat_org: self.slack_org.clone(),
            invite_user_ids: self.invite_user_ids.clone(),
            notify_channel_ids: self.notify_channel_ids.clone(),
            cc_group_ids: self.cc_group_ids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const SLACK: [(&str, &str); 3] = [
        ("SLACK_API_TOKEN", "xoxb-1"),
        ("SLACK_SIGNING_SECRET", "shh"),
        ("INCIDENT_DOC_URL", "https://docs.example.com/incidents"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&SLACK).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_request_age_secs, 300);
        assert_eq!(config.slack_org, "");
        assert_eq!(config.incident_doc_url, "https://docs.example.com/incidents");
        assert_eq!(config.channel_prefix, "incd-");
        assert!(config.invite_user_ids.is_empty());
        assert!(config.pagerduty.is_none());
        assert!(config.notion.is_none());
    }

    #[test]
    fn test_missing_slack_token() {
        let err = load(&[("SLACK_SIGNING_SECRET", "shh")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SLACK_API_TOKEN"));
    }

    #[test]
    fn test_missing_doc_url() {
        let err = load(&SLACK[..2]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("INCIDENT_DOC_URL"));
    }

    #[test]
    fn test_empty_value_is_unset() {
        let err = load(&[("SLACK_API_TOKEN", "xoxb-1"), ("SLACK_SIGNING_SECRET", "  ")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SLACK_SIGNING_SECRET"));
    }

    #[test]
    fn test_lists_trim_and_drop_empty_entries() {
        let mut vars = SLACK.to_vec();
        vars.push(("SLACK_NOTIFY_CHANNEL_IDS", "C1, C2,,"));
        vars.push(("SLACK_INVITE_USERS", ","));
        let config = load(&vars).unwrap();
        assert_eq!(config.notify_channel_ids, vec!["C1", "C2"]);
        assert!(config.invite_user_ids.is_empty());
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = SLACK.to_vec();
        vars.push(("INCIDENT_MANAGER_PORT", "http"));
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "INCIDENT_MANAGER_PORT", .. }));
    }

    #[test]
    fn test_invalid_request_age() {
        let mut vars = SLACK.to_vec();
        vars.push(("SLACK_MAX_REQUEST_AGE_SECS", "0"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_pagerduty_requires_references() {
        let mut vars = SLACK.to_vec();
        vars.push(("PAGERDUTY_API_TOKEN", "pd"));
        vars.push(("PAGERDUTY_SERVICE_ID", "PS"));
        let err = load(&vars).unwrap_err();
        assert_eq!(err, ConfigError::Missing("PAGERDUTY_ESCALATION_POLICY_ID"));

        vars.push(("PAGERDUTY_ESCALATION_POLICY_ID", "PE"));
        vars.push(("PAGERDUTY_FROM_EMAIL", "oncall@example.com"));
        let pagerduty = load(&vars).unwrap().pagerduty.unwrap();
        assert_eq!(pagerduty.service_id, "PS");
        assert_eq!(pagerduty.from_email, "oncall@example.com");
    }

    #[test]
    fn test_notion_requires_database() {
        let mut vars = SLACK.to_vec();
        vars.push(("NOTION_API_KEY", "secret"));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("NOTION_DB_ID"));

        vars.push(("NOTION_DB_ID", "db"));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("SLACK_ORG"));

        vars.push(("SLACK_ORG", "acme"));
        let config = load(&vars).unwrap();
        assert_eq!(config.notion.as_ref().unwrap().database_id, "db");
        assert_eq!(
            config.workflow_settings().channel_url("C1"),
            "https://acme.slack.com/archives/C1"
        );
    }

    #[test]
    fn test_workflow_settings() {
        let mut vars = SLACK.to_vec();
        vars.push(("SLACK_ORG", "acme"));
        vars.push(("SLACK_CC_GROUP_IDS", "S1,S2"));
        vars.push(("INCIDENT_CHANNEL_PREFIX", "inc-"));
        let settings = load(&vars).unwrap().workflow_settings();
        assert_eq!(settings.chat_org, "acme");
        assert_eq!(settings.channel_prefix, "inc-");
        assert_eq!(settings.cc_group_ids, vec!["S1", "S2"]);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", load(&SLACK).unwrap());
        assert!(!rendered.contains("xoxb-1"));
        assert!(!rendered.contains("shh"));
    }
}
