//! GitHub webhook payload -> InboundEvent

use serde::Deserialize;
use thiserror::Error;
use triage_core::api::{InboundEvent, Issue};

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed {event} payload: {source}")]
    Malformed {
        event: String,
        source: serde_json::Error,
    },
}

/// What the webhook handler should do with a delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Ping,
    Event(InboundEvent),
    Ignored(&'static str),
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl User {
    fn is_bot(&self) -> bool {
        self.kind.as_deref() == Some("Bot") || self.login.ends_with("[bot]")
    }
}

#[derive(Debug, Deserialize)]
struct Label {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GithubIssue {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<String>,
    user: User,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

impl From<GithubIssue> for Issue {
    fn from(gh: GithubIssue) -> Self {
        Issue {
            number: gh.number,
            title: gh.title,
            body: gh.body.unwrap_or_default(),
            author: gh.user.login,
            labels: gh.labels.into_iter().map(|l| l.name).collect(),
            html_url: gh.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Comment {
    #[serde(default)]
    body: Option<String>,
    user: User,
}

#[derive(Debug, Deserialize)]
struct IssuesPayload {
    action: String,
    issue: GithubIssue,
    repository: Repository,
}

#[derive(Debug, Deserialize)]
struct IssueCommentPayload {
    action: String,
    issue: GithubIssue,
    comment: Comment,
    repository: Repository,
}

fn decode<'a, T: Deserialize<'a>>(event: &str, body: &'a [u8]) -> Result<T, PayloadError> {
    serde_json::from_slice(body).map_err(|source| PayloadError::Malformed {
        event: event.to_string(),
        source,
    })
}

/// Maps one delivery, keyed by its `X-GitHub-Event` header.
pub fn parse_webhook(event: &str, body: &[u8]) -> Result<WebhookEvent, PayloadError> {
    match event {
        "ping" => Ok(WebhookEvent::Ping),
        "issues" => {
            let p: IssuesPayload = decode(event, body)?;
            if p.action != "opened" {
                return Ok(WebhookEvent::Ignored("issue action not handled"));
            }
            Ok(WebhookEvent::Event(InboundEvent::IssueOpened {
                repository: p.repository.full_name,
                issue: p.issue.into(),
            }))
        }
        "issue_comment" => {
            let p: IssueCommentPayload = decode(event, body)?;
            if p.action != "created" {
                return Ok(WebhookEvent::Ignored("comment action not handled"));
            }
            if p.issue.pull_request.is_some() {
                return Ok(WebhookEvent::Ignored("pull request comment"));
            }
            if p.comment.user.is_bot() {
                return Ok(WebhookEvent::Ignored("bot comment"));
            }
            Ok(WebhookEvent::Event(InboundEvent::CommentCreated {
                repository: p.repository.full_name,
                issue: p.issue.into(),
                comment: p.comment.body.unwrap_or_default(),
                commenter: p.comment.user.login,
            }))
        }
        _ => Ok(WebhookEvent::Ignored("event type not handled")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn issue_json() -> serde_json::Value {
        json!({
            "number": 42,
            "title": "Crash on login",
            "body": null,
            "user": { "login": "octocat", "type": "User" },
            "labels": [{ "name": "bug" }],
            "html_url": "https://github.com/acme/api/issues/42"
        })
    }

    fn bytes(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn test_issue_opened_maps_to_event() {
        let body = bytes(json!({
            "action": "opened",
            "issue": issue_json(),
            "repository": { "full_name": "acme/api" }
        }));
        let parsed = parse_webhook("issues", &body).unwrap();
        assert_eq!(
            parsed,
            WebhookEvent::Event(InboundEvent::IssueOpened {
                repository: "acme/api".to_string(),
                issue: Issue {
                    number: 42,
                    title: "Crash on login".to_string(),
                    body: String::new(),
                    author: "octocat".to_string(),
                    labels: vec!["bug".to_string()],
                    html_url: Some("https://github.com/acme/api/issues/42".to_string()),
                },
            })
        );
    }

    #[test]
    fn test_other_issue_actions_are_ignored() {
        let body = bytes(json!({
            "action": "closed",
            "issue": issue_json(),
            "repository": { "full_name": "acme/api" }
        }));
        assert_eq!(
            parse_webhook("issues", &body).unwrap(),
            WebhookEvent::Ignored("issue action not handled")
        );
    }

    #[test]
    fn test_comment_created_carries_comment() {
        let body = bytes(json!({
            "action": "created",
            "issue": issue_json(),
            "comment": { "body": "/ralph go", "user": { "login": "maint", "type": "User" } },
            "repository": { "full_name": "acme/api" }
        }));
        let WebhookEvent::Event(InboundEvent::CommentCreated { comment, commenter, .. }) =
            parse_webhook("issue_comment", &body).unwrap()
        else {
            panic!("expected a comment event");
        };
        assert_eq!(comment, "/ralph go");
        assert_eq!(commenter, "maint");
    }

    #[test]
    fn test_pull_request_and_bot_comments_are_ignored() {
        let mut pr_issue = issue_json();
        pr_issue["pull_request"] =
            json!({ "url": "https://api.github.com/repos/acme/api/pulls/42" });
        let pr = bytes(json!({
            "action": "created",
            "issue": pr_issue,
            "comment": { "body": "/ralph", "user": { "login": "maint" } },
            "repository": { "full_name": "acme/api" }
        }));
        assert_eq!(
            parse_webhook("issue_comment", &pr).unwrap(),
            WebhookEvent::Ignored("pull request comment")
        );

        let bot = bytes(json!({
            "action": "created",
            "issue": issue_json(),
            "comment": {
                "body": "/ralph",
                "user": { "login": "triage-relay[bot]", "type": "Bot" }
            },
            "repository": { "full_name": "acme/api" }
        }));
        assert_eq!(
            parse_webhook("issue_comment", &bot).unwrap(),
            WebhookEvent::Ignored("bot comment")
        );
    }

    #[test]
    fn test_ping_and_unknown_events() {
        assert_eq!(parse_webhook("ping", b"{}").unwrap(), WebhookEvent::Ping);
        assert_eq!(
            parse_webhook("push", b"{}").unwrap(),
            WebhookEvent::Ignored("event type not handled")
        );
    }

    #[test]
    fn test_malformed_payload_is_error() {
        let err = parse_webhook("issues", b"{\"action\":\"opened\"}").unwrap_err();
        assert!(err.to_string().starts_with("malformed issues payload"));
    }
}
