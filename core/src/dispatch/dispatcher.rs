use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::traits::{Commenter, FixInvoker, Notifier};
use crate::classifier::Classification;
use crate::config::TimeoutsConfig;
use crate::decision::{Decision, Verdict};
use crate::error::DispatchError;
use crate::events::Issue;
use crate::format::{self, ActionStatus};
use crate::metrics::Metrics;

#[derive(Debug, Clone, Copy)]
pub struct DispatchTimeouts {
    pub notifier: Duration,
    pub commenter: Duration,
    pub fix_invoker: Duration,
}

impl From<&TimeoutsConfig> for DispatchTimeouts {
    fn from(cfg: &TimeoutsConfig) -> Self {
        Self {
            notifier: cfg.notifier(),
            commenter: cfg.commenter(),
            fix_invoker: cfg.fix_invoker(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub decision: Decision,
    pub fix_started: bool,
    pub comment_posted: bool,
    pub notified: bool,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<DispatchError>,
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[DispatchError],
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_seq(errors.iter().map(|e| e.to_string()))
}

impl DispatchOutcome {
    fn new(decision: Decision) -> Self {
        Self {
            decision,
            fix_started: false,
            comment_posted: false,
            notified: false,
            errors: Vec::new(),
        }
    }
}

/// Executes exactly one branch per decision. Every branch ends with a
/// notification attempt, whatever happened before it.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    commenter: Arc<dyn Commenter>,
    fix_invoker: Arc<dyn FixInvoker>,
    timeouts: DispatchTimeouts,
    metrics: Arc<Metrics>,
}

impl Dispatcher {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        commenter: Arc<dyn Commenter>,
        fix_invoker: Arc<dyn FixInvoker>,
        timeouts: DispatchTimeouts,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            notifier,
            commenter,
            fix_invoker,
            timeouts,
            metrics,
        }
    }

    pub async fn execute(
        &self,
        verdict: &Verdict,
        repository: &str,
        issue: &Issue,
        classification: &Classification,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::new(verdict.decision);

        let status = match verdict.decision {
            Decision::AutoAct => {
                let instructions = classification.fix_instructions.clone().unwrap_or_else(|| {
                    format::fallback_fix_instructions(repository, issue, classification)
                });
                let result = bounded(
                    self.timeouts.fix_invoker,
                    self.fix_invoker.invoke(repository, issue.number, &instructions),
                )
                .await;
                match result {
                    Ok(()) => {
                        outcome.fix_started = true;
                        self.metrics.record_auto_spawned();
                        tracing::info!(
                            stage = "dispatch.fix",
                            repository = %repository,
                            issue = issue.number,
                            "fix agent started"
                        );
                        ActionStatus::FixStarted
                    }
                    Err(msg) => {
                        self.fail(
                            &mut outcome,
                            DispatchError::Spawn(msg.clone()),
                            repository,
                            issue,
                        );
                        ActionStatus::FixFailed(msg)
                    }
                }
            }
            Decision::Clarify => {
                let body = format::clarification_comment(&classification.open_questions);
                let result = bounded(
                    self.timeouts.commenter,
                    self.commenter.comment(repository, issue.number, &body),
                )
                .await;
                match result {
                    Ok(()) => {
                        outcome.comment_posted = true;
                        self.metrics.record_clarification_posted();
                        ActionStatus::QuestionsPosted(classification.open_questions.len())
                    }
                    Err(msg) => {
                        self.fail(
                            &mut outcome,
                            DispatchError::Comment(msg.clone()),
                            repository,
                            issue,
                        );
                        ActionStatus::QuestionsFailed(msg)
                    }
                }
            }
            Decision::Offer | Decision::Notify => ActionStatus::None,
        };

        let message = format::notification(repository, issue, classification, verdict, &status);
        match bounded(self.timeouts.notifier, self.notifier.notify(&message)).await {
            Ok(()) => {
                outcome.notified = true;
                self.metrics.record_notification_sent();
            }
            Err(msg) => self.fail(&mut outcome, DispatchError::Notify(msg), repository, issue),
        }

        outcome
    }

    fn fail(
        &self,
        outcome: &mut DispatchOutcome,
        err: DispatchError,
        repository: &str,
        issue: &Issue,
    ) {
        self.metrics.record_error();
        tracing::error!(
            stage = "dispatch.error",
            kind = err.kind(),
            decision = %outcome.decision,
            repository = %repository,
            issue = issue.number,
            error = %err
        );
        outcome.errors.push(err);
    }
}

/// Runs a collaborator call under a deadline. A timeout is a plain failure.
async fn bounded<F>(limit: Duration, call: F) -> Result<(), String>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(_) => Err(format!("timed out after {}ms", limit.as_millis())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Category, Severity};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Hangs;

    #[async_trait]
    impl FixInvoker for Hangs {
        async fn invoke(
            &self,
            _repo: &str,
            _issue: u64,
            _instructions: &str,
        ) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[async_trait]
    impl Commenter for Hangs {
        async fn comment(&self, _repo: &str, _issue: u64, _body: &str) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Inbox(Mutex<Vec<String>>);

    #[async_trait]
    impl Notifier for Inbox {
        async fn notify(&self, message: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    fn classification(questions: &[&str]) -> Classification {
        Classification {
            category: Category::Bug,
            severity: Severity::Medium,
            auto_fixable: true,
            confidence: 0.9,
            rationale: "clear repro".to_string(),
            open_questions: questions.iter().map(|q| q.to_string()).collect(),
            acceptance_criteria: vec![],
            fix_instructions: Some("Guard the null session.".to_string()),
        }
    }

    fn issue() -> Issue {
        Issue {
            number: 42,
            title: "Crash on login".to_string(),
            body: String::new(),
            author: "octocat".to_string(),
            labels: vec![],
            html_url: None,
        }
    }

    fn dispatcher(inbox: Arc<Inbox>, metrics: Arc<Metrics>) -> Dispatcher {
        Dispatcher::new(
            inbox,
            Arc::new(Hangs),
            Arc::new(Hangs),
            DispatchTimeouts::from(&TimeoutsConfig::default()),
            metrics,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fix_timeout_is_spawn_failure_and_still_notifies() {
        let inbox = Arc::new(Inbox::default());
        let metrics = Arc::new(Metrics::new());
        let verdict = Verdict::new(Decision::AutoAct, "confidence 0.90 >= 0.85");

        let outcome = dispatcher(inbox.clone(), metrics.clone())
            .execute(&verdict, "acme/api", &issue(), &classification(&[]))
            .await;

        assert!(!outcome.fix_started);
        assert!(outcome.notified);
        assert_eq!(
            outcome.errors,
            vec![DispatchError::Spawn("timed out after 120000ms".to_string())]
        );
        let sent = inbox.0.lock().unwrap();
        assert!(sent[0].contains("Fix agent failed to start: timed out after 120000ms"));
        assert_eq!(metrics.snapshot(0).errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_comment_timeout_is_comment_failure() {
        let inbox = Arc::new(Inbox::default());
        let verdict = Verdict::new(Decision::Clarify, "1 open question(s)");

        let outcome = dispatcher(inbox.clone(), Arc::new(Metrics::new()))
            .execute(&verdict, "acme/api", &issue(), &classification(&["Which page?"]))
            .await;

        assert!(!outcome.comment_posted);
        assert!(outcome.notified);
        assert_eq!(outcome.errors[0].kind(), "comment");
    }

    #[tokio::test]
    async fn test_notify_only_branches_touch_nothing_else() {
        let inbox = Arc::new(Inbox::default());
        for decision in [Decision::Offer, Decision::Notify] {
            let outcome = dispatcher(inbox.clone(), Arc::new(Metrics::new()))
                .execute(
                    &Verdict::new(decision, "reason"),
                    "acme/api",
                    &issue(),
                    &classification(&[]),
                )
                .await;
            assert!(outcome.notified);
            assert!(outcome.errors.is_empty());
        }
        assert_eq!(inbox.0.lock().unwrap().len(), 2);
    }
}
