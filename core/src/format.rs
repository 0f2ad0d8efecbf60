//! Human-facing text: notifications, clarification comments, fallback fix instructions.

use std::fmt::Write as _;

use crate::classifier::Classification;
use crate::decision::{Decision, Verdict};
use crate::events::{Issue, TRIGGER_TOKEN};

/// Result of the branch-specific step, reported in the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    None,
    FixStarted,
    FixFailed(String),
    QuestionsPosted(usize),
    QuestionsFailed(String),
}

pub fn notification(
    repository: &str,
    issue: &Issue,
    classification: &Classification,
    verdict: &Verdict,
    status: &ActionStatus,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {}#{}: {}",
        verdict.decision,
        repository,
        issue.number,
        issue.title.trim()
    );
    let _ = writeln!(
        out,
        "Category: {} | Severity: {} | Confidence: {:.0}%",
        classification.category,
        classification.severity,
        classification.confidence * 100.0
    );
    let _ = writeln!(out, "Decision: {}", verdict.reason);
    if !classification.rationale.is_empty() {
        let _ = writeln!(out, "Rationale: {}", classification.rationale);
    }

    match status {
        ActionStatus::None => {}
        ActionStatus::FixStarted => out.push_str("Fix agent started.\n"),
        ActionStatus::FixFailed(err) => {
            let _ = writeln!(out, "Fix agent failed to start: {err}");
        }
        ActionStatus::QuestionsPosted(n) => {
            let _ = writeln!(out, "Posted {n} clarifying question(s) on the issue.");
        }
        ActionStatus::QuestionsFailed(err) => {
            let _ = writeln!(out, "Could not post clarifying questions: {err}");
        }
    }

    if verdict.decision == Decision::Offer {
        let _ = writeln!(
            out,
            "Looks fixable. Comment `{TRIGGER_TOKEN}` on the issue to start the fix agent."
        );
    }

    if let Some(url) = issue.html_url.as_deref() {
        let _ = writeln!(out, "{url}");
    }

    out.trim_end().to_string()
}

/// Comment asking the reporter for the missing details, one numbered line each.
pub fn clarification_comment(questions: &[String]) -> String {
    let mut out = String::from(
        "Thanks for the report! Before this can be worked on, a few details need clarifying:\n\n",
    );
    for (i, q) in questions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, q);
    }
    out.push_str("\nPlease reply in this thread and the issue will be picked up again.");
    out
}

/// Instructions for the fix agent when the classification did not supply any.
pub fn fallback_fix_instructions(
    repository: &str,
    issue: &Issue,
    classification: &Classification,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Resolve {}#{}: {}",
        repository,
        issue.number,
        issue.title.trim()
    );
    let _ = writeln!(
        out,
        "Type: {} (severity {})",
        classification.category, classification.severity
    );
    if !classification.rationale.is_empty() {
        let _ = writeln!(out, "Analysis: {}", classification.rationale);
    }
    if !classification.acceptance_criteria.is_empty() {
        out.push_str("Acceptance criteria:\n");
        for c in &classification.acceptance_criteria {
            let _ = writeln!(out, "- {c}");
        }
    }
    out.push_str(
        "Keep the change minimal, add or update tests, and reference the issue in the commit.",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Category, Severity};
    use pretty_assertions::assert_eq;

    fn issue() -> Issue {
        Issue {
            number: 12,
            title: "Null pointer on login".into(),
            body: "crash".into(),
            author: "octocat".into(),
            labels: vec![],
            html_url: Some("https://github.com/acme/api/issues/12".into()),
        }
    }

    fn classification() -> Classification {
        Classification {
            category: Category::Bug,
            severity: Severity::High,
            auto_fixable: true,
            confidence: 0.91,
            rationale: "Session is dereferenced before the null check.".into(),
            open_questions: vec![],
            acceptance_criteria: vec!["Login succeeds".into(), "Test covers null session".into()],
            fix_instructions: None,
        }
    }

    #[test]
    fn test_clarification_comment_numbers_questions() {
        let text = clarification_comment(&["Which page is affected?".to_string()]);
        assert_eq!(
            text,
            "Thanks for the report! Before this can be worked on, a few details need clarifying:\n\
             \n\
             1. Which page is affected?\n\
             \n\
             Please reply in this thread and the issue will be picked up again."
        );
    }

    #[test]
    fn test_notification_for_auto_act() {
        let verdict = Verdict {
            decision: Decision::AutoAct,
            reason: "confidence 0.91 >= 0.85".into(),
        };
        let text = notification(
            "acme/api",
            &issue(),
            &classification(),
            &verdict,
            &ActionStatus::FixStarted,
        );
        assert_eq!(
            text,
            "[AUTO_ACT] acme/api#12: Null pointer on login\n\
             Category: bug | Severity: high | Confidence: 91%\n\
             Decision: confidence 0.91 >= 0.85\n\
             Rationale: Session is dereferenced before the null check.\n\
             Fix agent started.\n\
             https://github.com/acme/api/issues/12"
        );
    }

    #[test]
    fn test_notification_for_offer_mentions_trigger() {
        let verdict = Verdict {
            decision: Decision::Offer,
            reason: "confidence 0.72 >= 0.70".into(),
        };
        let text = notification(
            "acme/api",
            &issue(),
            &classification(),
            &verdict,
            &ActionStatus::None,
        );
        assert!(text.contains("Comment `/ralph`"));
        assert!(text.starts_with("[OFFER] acme/api#12"));
    }

    #[test]
    fn test_fallback_instructions() {
        let text = fallback_fix_instructions("acme/api", &issue(), &classification());
        assert_eq!(
            text,
            "Resolve acme/api#12: Null pointer on login\n\
             Type: bug (severity high)\n\
             Analysis: Session is dereferenced before the null check.\n\
             Acceptance criteria:\n\
             - Login succeeds\n\
             - Test covers null session\n\
             Keep the change minimal, add or update tests, and reference the issue in the commit."
        );
    }
}
