//! Inbound events handed to the engine by the transport host.

use serde::{Deserialize, Serialize};

/// Comment prefix that requests the fix agent for an issue.
pub const TRIGGER_TOKEN: &str = "/ralph";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Issue {
    /// Title and body joined by a single space; the text sensitive patterns run against.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    IssueOpened {
        repository: String,
        issue: Issue,
    },
    /// A new comment on an issue. The issue snapshot travels with it.
    CommentCreated {
        repository: String,
        issue: Issue,
        comment: String,
        commenter: String,
    },
}

impl InboundEvent {
    pub fn repository(&self) -> &str {
        match self {
            Self::IssueOpened { repository, .. } | Self::CommentCreated { repository, .. } => {
                repository
            }
        }
    }

    pub fn issue(&self) -> &Issue {
        match self {
            Self::IssueOpened { issue, .. } | Self::CommentCreated { issue, .. } => issue,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::IssueOpened { .. } => "issue_opened",
            Self::CommentCreated { .. } => "comment_created",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixTrigger {
    /// Free text after the token. Carried for logs, ignored for routing.
    pub note: Option<String>,
}

/// Case-sensitive prefix match on [`TRIGGER_TOKEN`]. The token must be followed by
/// whitespace or end of text, so `/ralphie` is not a trigger.
pub fn parse_trigger(comment: &str) -> Option<FixTrigger> {
    let rest = comment.strip_prefix(TRIGGER_TOKEN)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let note = rest.trim();
    Some(FixTrigger {
        note: (!note.is_empty()).then(|| note.to_string()),
    })
}
