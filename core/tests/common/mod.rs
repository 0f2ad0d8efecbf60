#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use triage_core::api::{
    AnalysisProvider, Commenter, FixInvoker, InboundEvent, Issue, ManualClock, MemoryDedupStore,
    Notifier, PolicyStore, RepositoryConfig, Services, TimeoutsConfig, TriageEngine,
};
use triage_core::config::Priority;

/// Ordered record of collaborator calls across all fakes.
pub type Journal = Arc<Mutex<Vec<String>>>;

fn log(journal: &Journal, entry: String) {
    journal.lock().unwrap().push(entry);
}

pub enum Reply {
    Text(String),
    Fail(String),
    Hang,
}

pub struct FakeProvider {
    pub reply: Mutex<Reply>,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl AnalysisProvider for FakeProvider {
    async fn complete(&self, prompt: String) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt);
        let reply = match &*self.reply.lock().unwrap() {
            Reply::Text(t) => Some(Ok(t.clone())),
            Reply::Fail(e) => Some(Err(e.clone())),
            Reply::Hang => None,
        };
        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => anyhow::bail!(e),
            None => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                anyhow::bail!("provider hung")
            }
        }
    }
}

pub struct FakeNotifier {
    pub journal: Journal,
    pub messages: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, message: &str) -> anyhow::Result<()> {
        log(&self.journal, "notify".into());
        if self.fail {
            anyhow::bail!("webhook returned 500");
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub struct FakeCommenter {
    pub journal: Journal,
    pub comments: Mutex<Vec<(String, u64, String)>>,
    pub fail: bool,
}

#[async_trait]
impl Commenter for FakeCommenter {
    async fn comment(&self, repository: &str, issue: u64, body: &str) -> anyhow::Result<()> {
        log(&self.journal, "comment".into());
        if self.fail {
            anyhow::bail!("github returned 403");
        }
        self.comments
            .lock()
            .unwrap()
            .push((repository.to_string(), issue, body.to_string()));
        Ok(())
    }
}

pub struct FakeFixInvoker {
    pub journal: Journal,
    pub calls: Mutex<Vec<(String, u64, String)>>,
    pub fail: bool,
}

#[async_trait]
impl FixInvoker for FakeFixInvoker {
    async fn invoke(&self, repository: &str, issue: u64, instructions: &str) -> anyhow::Result<()> {
        log(&self.journal, "fix".into());
        if self.fail {
            anyhow::bail!("command not found: ralph");
        }
        self.calls
            .lock()
            .unwrap()
            .push((repository.to_string(), issue, instructions.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct Failures {
    pub notify: bool,
    pub comment: bool,
    pub fix: bool,
}

pub struct Harness {
    pub engine: Arc<TriageEngine>,
    pub clock: Arc<ManualClock>,
    pub journal: Journal,
    pub provider: Arc<FakeProvider>,
    pub notifier: Arc<FakeNotifier>,
    pub commenter: Arc<FakeCommenter>,
    pub fix: Arc<FakeFixInvoker>,
}

impl Harness {
    pub fn new(reply: Reply, repos: Vec<RepositoryConfig>, failures: Failures) -> Self {
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        let provider = Arc::new(FakeProvider {
            reply: Mutex::new(reply),
            prompts: Mutex::new(Vec::new()),
        });
        let notifier = Arc::new(FakeNotifier {
            journal: journal.clone(),
            messages: Mutex::new(Vec::new()),
            fail: failures.notify,
        });
        let commenter = Arc::new(FakeCommenter {
            journal: journal.clone(),
            comments: Mutex::new(Vec::new()),
            fail: failures.comment,
        });
        let fix = Arc::new(FakeFixInvoker {
            journal: journal.clone(),
            calls: Mutex::new(Vec::new()),
            fail: failures.fix,
        });

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
        ));
        let dedup = Arc::new(MemoryDedupStore::new(chrono::Duration::hours(24), clock.clone()));
        let services = Services {
            provider: provider.clone(),
            notifier: notifier.clone(),
            commenter: commenter.clone(),
            fix_invoker: fix.clone(),
        };
        let engine = Arc::new(TriageEngine::new(
            services,
            Arc::new(PolicyStore::from_config(&repos)),
            dedup,
            &TimeoutsConfig::default(),
        ));

        Self {
            engine,
            clock,
            journal,
            provider,
            notifier,
            commenter,
            fix,
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.provider.reply.lock().unwrap() = reply;
    }
}

pub fn repo(name: &str, auto_action_enabled: bool, patterns: &[&str]) -> RepositoryConfig {
    RepositoryConfig {
        name: name.to_string(),
        enabled: true,
        auto_action_enabled,
        sensitive_patterns: patterns.iter().map(|s| s.to_string()).collect(),
        priority: Priority::Medium,
        project_location: None,
    }
}

pub fn issue(number: u64, title: &str, body: &str) -> Issue {
    Issue {
        number,
        title: title.to_string(),
        body: body.to_string(),
        author: "octocat".to_string(),
        labels: vec![],
        html_url: Some(format!("https://github.com/acme/api/issues/{number}")),
    }
}

pub fn opened(repository: &str, issue: Issue) -> InboundEvent {
    InboundEvent::IssueOpened {
        repository: repository.to_string(),
        issue,
    }
}

pub fn commented(repository: &str, issue: Issue, comment: &str) -> InboundEvent {
    InboundEvent::CommentCreated {
        repository: repository.to_string(),
        issue,
        comment: comment.to_string(),
        commenter: "maintainer".to_string(),
    }
}

/// Provider reply for a classification with the given routing fields.
pub fn reply(auto_fixable: bool, confidence: f64, questions: &[&str]) -> Reply {
    Reply::Text(
        serde_json::json!({
            "category": "bug",
            "severity": "high",
            "autoFixable": auto_fixable,
            "confidence": confidence,
            "rationale": "Session is dereferenced before the null check.",
            "openQuestions": questions,
            "acceptanceCriteria": ["Login succeeds"],
            "fixInstructions": null
        })
        .to_string(),
    )
}
