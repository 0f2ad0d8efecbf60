use std::fmt::Write as _;

use crate::events::Issue;
use crate::policy::RepoPolicy;

const MAX_BODY_CHARS: usize = 12_000;

const RESPONSE_SCHEMA: &str = r#"{
  "category": "bug | feature | enhancement | question | docs | chore",
  "severity": "critical | high | medium | low",
  "autoFixable": true | false,
  "confidence": 0.0-1.0,
  "rationale": "<one or two sentences>",
  "openQuestions": ["<question for the reporter>", ...],
  "acceptanceCriteria": ["<observable outcome>", ...],
  "fixInstructions": "<concrete steps for a coding agent>" | null
}"#;

/// Builds the classification prompt for one issue.
pub fn build_prompt(issue: &Issue, repository: &str, policy: &RepoPolicy) -> String {
    let mut out = String::with_capacity(2048 + issue.body.len().min(MAX_BODY_CHARS));

    out.push_str(
        "You are triaging a newly reported GitHub issue. Classify it and decide whether \
         an autonomous coding agent could implement a correct, narrowly scoped fix.\n\n",
    );

    let _ = writeln!(out, "Repository: {repository}");
    if let Some(location) = policy.project_location.as_deref() {
        let _ = writeln!(out, "Project location: {location}");
    }
    let _ = writeln!(out, "Issue: #{}", issue.number);
    let _ = writeln!(out, "Title: {}", issue.title.trim());
    let _ = writeln!(out, "Author: {}", issue.author);
    if issue.labels.is_empty() {
        out.push_str("Labels: (none)\n");
    } else {
        let _ = writeln!(out, "Labels: {}", issue.labels.join(", "));
    }

    out.push_str("\nBody:\n");
    let body = issue.body.trim();
    if body.is_empty() {
        out.push_str("(empty)\n");
    } else {
        out.extend(body.chars().take(MAX_BODY_CHARS));
        if body.chars().count() > MAX_BODY_CHARS {
            out.push_str("\n[body truncated]");
        }
        out.push('\n');
    }

    out.push_str(
        "\nRules:\n\
         - If the report lacks information needed to act, list the missing details in \
         openQuestions; otherwise return an empty array.\n\
         - autoFixable is true only when the fix is small, well understood and verifiable.\n\
         - confidence is your certainty in the whole assessment.\n\n\
         Respond with a single JSON object and nothing else, using exactly these keys:\n",
    );
    out.push_str(RESPONSE_SCHEMA);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(body: &str) -> Issue {
        Issue {
            number: 42,
            title: "Null pointer on login".into(),
            body: body.into(),
            author: "octocat".into(),
            labels: vec!["bug".into(), "auth".into()],
            html_url: None,
        }
    }

    #[test]
    fn test_prompt_contains_issue_context() {
        let mut policy = RepoPolicy::disabled("acme/api");
        policy.project_location = Some("/srv/acme/api".into());

        let prompt = build_prompt(&issue("Steps: open /login"), "acme/api", &policy);
        assert!(prompt.contains("Repository: acme/api"));
        assert!(prompt.contains("Project location: /srv/acme/api"));
        assert!(prompt.contains("Issue: #42"));
        assert!(prompt.contains("Title: Null pointer on login"));
        assert!(prompt.contains("Author: octocat"));
        assert!(prompt.contains("Labels: bug, auth"));
        assert!(prompt.contains("Steps: open /login"));
        assert!(prompt.contains("\"openQuestions\""));
    }

    #[test]
    fn test_prompt_omits_missing_location_and_marks_empty_body() {
        let policy = RepoPolicy::disabled("acme/api");
        let prompt = build_prompt(&issue("   "), "acme/api", &policy);
        assert!(!prompt.contains("Project location"));
        assert!(prompt.contains("(empty)"));
    }

    #[test]
    fn test_prompt_truncates_long_body() {
        let policy = RepoPolicy::disabled("acme/api");
        let prompt = build_prompt(&issue(&"x".repeat(MAX_BODY_CHARS + 50)), "acme/api", &policy);
        assert!(prompt.contains("[body truncated]"));
    }
}
