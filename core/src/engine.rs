//! Admission, then classify -> decide -> dispatch in a detached task.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::classifier::{Classification, ClassifierGateway};
use crate::config::TimeoutsConfig;
use crate::context::Services;
use crate::decision::{self, Verdict};
use crate::dedup::{ActionClass, DedupKey, DedupStore};
use crate::dispatch::{DispatchOutcome, DispatchTimeouts, Dispatcher};
use crate::error::TriageError;
use crate::events::{parse_trigger, InboundEvent, Issue};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::policy::{PolicyStore, RepoPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    IssueOpened,
    FixRequested {
        requested_by: String,
        note: Option<String>,
    },
}

impl Trigger {
    pub fn action_class(&self) -> ActionClass {
        match self {
            Self::IssueOpened => ActionClass::Triage,
            Self::FixRequested { .. } => ActionClass::FixRequest,
        }
    }
}

/// Terminal, non-error outcomes of admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    PolicyDisabled,
    DuplicateEvent,
    /// A comment that does not start with the trigger token.
    NotATrigger,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PolicyDisabled => "policy_disabled",
            Self::DuplicateEvent => "duplicate_event",
            Self::NotATrigger => "not_a_trigger",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An admitted event, ready for the background phase.
#[derive(Debug, Clone)]
pub struct TriageJob {
    pub event_id: Uuid,
    pub repository: String,
    pub issue: Issue,
    pub trigger: Trigger,
    pub policy: Arc<RepoPolicy>,
    pub key: DedupKey,
}

#[derive(Debug)]
pub enum Admission {
    /// Admitted; the background task is already running. Dropping `handle`
    /// detaches it.
    Accepted {
        event_id: Uuid,
        key: DedupKey,
        handle: JoinHandle<()>,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageResult {
    pub classification: Classification,
    pub verdict: Verdict,
    pub outcome: DispatchOutcome,
}

pub struct TriageEngine {
    policies: Arc<PolicyStore>,
    dedup: Arc<dyn DedupStore>,
    classifier: ClassifierGateway,
    dispatcher: Dispatcher,
    metrics: Arc<Metrics>,
}

impl TriageEngine {
    pub fn new(
        services: Services,
        policies: Arc<PolicyStore>,
        dedup: Arc<dyn DedupStore>,
        timeouts: &TimeoutsConfig,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let classifier = ClassifierGateway::new(services.provider, timeouts.classifier());
        let dispatcher = Dispatcher::new(
            services.notifier,
            services.commenter,
            services.fix_invoker,
            DispatchTimeouts::from(timeouts),
            metrics.clone(),
        );
        Self {
            policies,
            dedup,
            classifier,
            dispatcher,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.dedup.len())
    }

    pub fn policies(&self) -> &PolicyStore {
        &self.policies
    }

    pub fn dedup(&self) -> &Arc<dyn DedupStore> {
        &self.dedup
    }

    /// Synchronous admission: trigger check, policy check, then the dedup slot.
    /// No I/O, no awaits.
    pub fn admit(&self, event: InboundEvent) -> Result<TriageJob, SkipReason> {
        self.metrics.record_received();

        let (repository, issue, trigger) = match event {
            InboundEvent::IssueOpened { repository, issue } => {
                (repository, issue, Trigger::IssueOpened)
            }
            InboundEvent::CommentCreated {
                repository,
                issue,
                comment,
                commenter,
            } => {
                let Some(fix) = parse_trigger(&comment) else {
                    self.metrics.record_skipped_irrelevant();
                    tracing::debug!(
                        repository = %repository,
                        issue = issue.number,
                        "comment is not a trigger"
                    );
                    return Err(SkipReason::NotATrigger);
                };
                (
                    repository,
                    issue,
                    Trigger::FixRequested {
                        requested_by: commenter,
                        note: fix.note,
                    },
                )
            }
        };

        let policy = self.policies.lookup(&repository);
        if !policy.enabled {
            self.metrics.record_skipped_disabled();
            tracing::info!(
                repository = %repository,
                issue = issue.number,
                reason = %SkipReason::PolicyDisabled,
                "event skipped"
            );
            return Err(SkipReason::PolicyDisabled);
        }

        let key = DedupKey::new(&repository, issue.number, trigger.action_class());
        if !self.dedup.admit(&key) {
            self.metrics.record_skipped_duplicate();
            tracing::info!(key = %key, reason = %SkipReason::DuplicateEvent, "event skipped");
            return Err(SkipReason::DuplicateEvent);
        }

        let event_id = Uuid::new_v4();
        tracing::info!(event_id = %event_id, key = %key, "event admitted");
        Ok(TriageJob {
            event_id,
            repository,
            issue,
            trigger,
            policy,
            key,
        })
    }

    /// Classify and decide, without touching the dedup cache or dispatching.
    pub async fn analyze(
        &self,
        repository: &str,
        issue: &Issue,
        trigger: &Trigger,
        policy: &RepoPolicy,
    ) -> Result<(Classification, Verdict), TriageError> {
        let classification = self.classifier.classify(issue, repository, policy).await?;
        let text = issue.text();
        let verdict = match trigger {
            Trigger::IssueOpened => decision::evaluate(&classification, policy, &text),
            Trigger::FixRequested { .. } => {
                decision::evaluate_requested(&classification, policy, &text)
            }
        };
        Ok((classification, verdict))
    }

    /// Background phase for one admitted job. Classification failures end the
    /// job here; the dedup slot stays consumed.
    pub async fn process(&self, job: TriageJob) -> Result<TriageResult, TriageError> {
        let (classification, verdict) = match self
            .analyze(&job.repository, &job.issue, &job.trigger, &job.policy)
            .await
        {
            Ok(v) => v,
            Err(err) => {
                self.metrics.record_classification_failure();
                tracing::error!(
                    stage = "classify.error",
                    kind = err.kind(),
                    key = %job.key,
                    error = %err,
                    "classification failed, no action taken"
                );
                return Err(err);
            }
        };

        self.metrics.record_decision(verdict.decision);
        tracing::info!(
            stage = "decide",
            key = %job.key,
            decision = %verdict.decision,
            reason = %verdict.reason,
            category = %classification.category,
            severity = %classification.severity,
            confidence = classification.confidence
        );

        let outcome = self
            .dispatcher
            .execute(&verdict, &job.repository, &job.issue, &classification)
            .await;
        self.metrics.record_processed();
        tracing::info!(
            stage = "dispatch.done",
            key = %job.key,
            fix_started = outcome.fix_started,
            comment_posted = outcome.comment_posted,
            notified = outcome.notified,
            errors = outcome.errors.len()
        );

        Ok(TriageResult {
            classification,
            verdict,
            outcome,
        })
    }

    /// Runs the dispatcher directly, for manual runs that bypass admission.
    pub async fn dispatch(
        &self,
        repository: &str,
        issue: &Issue,
        classification: &Classification,
        verdict: &Verdict,
    ) -> DispatchOutcome {
        self.dispatcher
            .execute(verdict, repository, issue, classification)
            .await
    }

    /// Admits `event` and, if accepted, spawns the background phase. Must be
    /// called from within a tokio runtime.
    pub fn submit(self: &Arc<Self>, event: InboundEvent) -> Admission {
        let job = match self.admit(event) {
            Ok(job) => job,
            Err(reason) => return Admission::Skipped(reason),
        };

        let event_id = job.event_id;
        let key = job.key.clone();
        let span = tracing::info_span!(
            "triage",
            event_id = %job.event_id,
            repository = %job.repository,
            issue = job.issue.number
        );
        let engine = Arc::clone(self);
        let handle = tokio::spawn(
            async move {
                // Errors are already logged and counted inside `process`.
                let _ = engine.process(job).await;
            }
            .instrument(span),
        );

        Admission::Accepted {
            event_id,
            key,
            handle,
        }
    }
}
