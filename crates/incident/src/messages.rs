//! Notification content for incident and broadcast channels.
//!
//! Everything here is a pure function of its inputs.

use crate::blocks::Block;
use crate::model::Severity;

/// Section used as vertical padding between message groups.
const SPACER: &str = "   ";

const CREATED_REMINDERS: &str = "*Reminders:*
• Use this channel to discuss the incident and any mitigation.
• On-call has been paged, but if you need to page other people, go to <https://pagerduty.com|Pagerduty> and click on the \"New incident\" button.
• A placeholder incident postmortem doc has been created in <https://www.notion.so|Notion>.
• When the incident is resolved, run `/resolve-incident` from this channel!";

const RESOLVED_NOTICE: &str = "🥳 The incident has been marked as resolved but the channel will be kept open for continued discussion.";

const RESOLVED_REMINDERS: &str = "*Reminders*:
• If needed, please fill out the postmortem doc created in <https://www.notion.so|Notion>.
• When you're ready to archive this channel, click on the channel name, then \"Settings\", then \"Archive channel for everyone\".";

/// Facts rendered into the incident summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryFields<'a> {
    /// Incident name
    pub name: &'a str,
    /// Free-text description
    pub description: &'a str,
    /// Severity
    pub severity: Severity,
    /// Incident channel id
    pub channel_id: &'a str,
    /// Declaring user id
    pub creator_id: &'a str,
    /// Paging incident link, when one was opened
    pub paging_url: Option<&'a str>,
}

/// Render the markdown incident summary shared by in-channel and broadcast messages.
///
/// The CC segment appears only when `cc_group_ids` is non-empty, one
/// `<!subteam^ID>` mention per group in the given order.
#[must_use]
pub fn summary(fields: &SummaryFields<'_>, cc_group_ids: &[String]) -> String {
    let cc = if cc_group_ids.is_empty() {
        String::new()
    } else {
        let mentions: Vec<String> = cc_group_ids
            .iter()
            .map(|id| format!("<!subteam^{id}>"))
            .collect();
        format!(" (cc: {})", mentions.join(" "))
    };

    let mut lines = vec![
        format!("*Incident:* `{}` _({})_", fields.name, fields.severity),
        format!("*Description:* {}", fields.description),
        format!("*Created by:* <@{}>{cc}", fields.creator_id),
        format!("*Channel for more discussion:* <#{}>", fields.channel_id),
    ];
    if let Some(url) = fields.paging_url {
        lines.push(format!("*PagerDuty incident:* {url}"));
    }

    lines.join("\n")
}

/// Blocks posted into a newly created incident channel.
#[must_use]
pub fn incident_created_blocks(summary: &str) -> Vec<Block> {
    vec![
        Block::section(summary),
        Block::Divider,
        Block::section(CREATED_REMINDERS),
        Block::section(SPACER),
        Block::Divider,
    ]
}

/// Blocks broadcast to notification channels when an incident is created.
#[must_use]
pub fn incident_created_notify_blocks(summary: &str) -> Vec<Block> {
    vec![
        Block::header("⚠️ New incident created"),
        Block::section(summary),
        Block::section(SPACER),
    ]
}

/// Blocks posted into the incident channel when it is resolved.
#[must_use]
pub fn incident_resolved_blocks() -> Vec<Block> {
    vec![Block::section(RESOLVED_NOTICE), Block::section(RESOLVED_REMINDERS)]
}

/// Blocks broadcast to notification channels when an incident is resolved.
#[must_use]
pub fn incident_resolved_notify_blocks(channel_id: &str) -> Vec<Block> {
    vec![
        Block::header("🥳 Incident marked as resolved"),
        Block::section(format!("*Incident channel:* <#{channel_id}>")),
    ]
}

/// Fallback text for creation messages.
#[must_use]
pub fn created_text(name: &str) -> String {
    format!("Created incident {name}")
}

/// Fallback text for resolution messages.
#[must_use]
pub fn resolved_text(name: &str) -> String {
    format!("Resolved incident {name}")
}

/// Direct message sent to the incident's creator.
#[must_use]
pub fn creator_dm_text(channel_id: &str) -> String {
    format!("I've created <#{channel_id}> and invited you to it.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> SummaryFields<'static> {
        SummaryFields {
            name: "20240101-brave-otter",
            description: "DB degraded",
            severity: Severity::Sev1,
            channel_id: "C123",
            creator_id: "U1",
            paging_url: None,
        }
    }

    #[test]
    fn test_summary_without_cc() {
        let text = summary(&fields(), &[]);
        assert_eq!(
            text,
            "*Incident:* `20240101-brave-otter` _(SEV1)_\n\
             *Description:* DB degraded\n\
             *Created by:* <@U1>\n\
             *Channel for more discussion:* <#C123>"
        );
        assert!(!text.contains("cc:"));
    }

    #[test]
    fn test_summary_cc_mentions_in_order() {
        let groups = vec!["S2".to_string(), "S1".to_string()];
        let text = summary(&fields(), &groups);
        assert!(text.contains("*Created by:* <@U1> (cc: <!subteam^S2> <!subteam^S1>)"));
        assert_eq!(text.matches("<!subteam^").count(), 2);
    }

    #[test]
    fn test_summary_includes_paging_link() {
        let mut f = fields();
        f.paging_url = Some("https://acme.pagerduty.com/incidents/P1");
        let text = summary(&f, &[]);
        assert!(text.ends_with("*PagerDuty incident:* https://acme.pagerduty.com/incidents/P1"));
    }

    #[test]
    fn test_builders_are_deterministic() {
        let groups = vec!["S1".to_string()];
        assert_eq!(summary(&fields(), &groups), summary(&fields(), &groups));

        let text = summary(&fields(), &groups);
        let a = serde_json::to_string(&incident_created_blocks(&text)).unwrap();
        let b = serde_json::to_string(&incident_created_blocks(&text)).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            incident_resolved_notify_blocks("C9"),
            incident_resolved_notify_blocks("C9")
        );
    }

    #[test]
    fn test_created_blocks_layout() {
        let blocks = incident_created_blocks("summary");
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0].text(), Some("summary"));
        assert_eq!(blocks[1], Block::Divider);
        assert!(blocks[2].text().unwrap().contains("/resolve-incident"));
        assert_eq!(blocks[3].text(), Some(SPACER));
        assert_eq!(blocks[4], Block::Divider);
    }

    #[test]
    fn test_notify_blocks_layout() {
        let blocks = incident_created_notify_blocks("summary");
        assert!(matches!(blocks[0], Block::Header { .. }));
        assert_eq!(blocks[1].text(), Some("summary"));

        let resolved = incident_resolved_notify_blocks("C42");
        assert_eq!(resolved[1].text(), Some("*Incident channel:* <#C42>"));
    }

    #[test]
    fn test_resolved_blocks_mention_archiving() {
        let blocks = incident_resolved_blocks();
        assert!(blocks[0].text().unwrap().contains("marked as resolved"));
        assert!(blocks[1].text().unwrap().contains("Archive channel"));
    }
}
