use serde::Serialize;
use triage_core::api::{
    AppConfig, Classification, CliError, DispatchOutcome, Issue, Trigger, Verdict,
};

use super::build_engine;
use super::cli::TriageArgs;

#[derive(Debug, Serialize)]
struct TriageReport<'a> {
    repository: &'a str,
    issue: u64,
    policy_enabled: bool,
    classification: &'a Classification,
    verdict: &'a Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<DispatchOutcome>,
}

/// 处理 triage 命令：classify -> decide，可选执行 dispatch
pub async fn handle_triage(args: TriageArgs, cfg: AppConfig) -> Result<i32, CliError> {
    let engine = build_engine(&cfg)?;
    let policy = engine.policies().lookup(&args.repo);
    if !policy.enabled {
        tracing::warn!(
            repository = %args.repo,
            "repository is not enabled; the webhook server would skip this issue"
        );
    }

    let issue = Issue {
        number: args.issue,
        title: args.title,
        body: args.body,
        author: args.author,
        labels: args.labels,
        html_url: None,
    };

    let (classification, verdict) = engine
        .analyze(&args.repo, &issue, &Trigger::IssueOpened, &policy)
        .await
        .map_err(|e| CliError::Command(e.to_string()))?;

    let outcome = if args.dispatch {
        Some(
            engine
                .dispatch(&args.repo, &issue, &classification, &verdict)
                .await,
        )
    } else {
        None
    };

    let report = TriageReport {
        repository: &args.repo,
        issue: issue.number,
        policy_enabled: policy.enabled,
        classification: &classification,
        verdict: &verdict,
        outcome,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::Command(format!("failed to render report: {e}")))?;
    println!("{json}");

    let failed = report.outcome.as_ref().is_some_and(|o| !o.errors.is_empty());
    Ok(if failed { 1 } else { 0 })
}
