//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `triage_core::api` instead of reaching into internal modules.

pub use crate::classifier::{
    parse_classification, AnalysisProvider, Category, Classification, ClassifierGateway, Severity,
};
pub use crate::config::{
    load, AppConfig, ClassifierConfig, DedupConfig, FixAgentConfig, GithubConfig, LoggingConfig,
    NotifierConfig, RepositoryConfig, ServerConfig, TimeoutsConfig,
};
pub use crate::context::{Services, ServicesFactory};
pub use crate::decision::{decide, decide_requested, evaluate, Decision, Verdict};
pub use crate::dedup::{
    spawn_sweeper, ActionClass, Clock, DedupKey, DedupStore, ManualClock, MemoryDedupStore,
    SystemClock,
};
pub use crate::dispatch::{Commenter, DispatchOutcome, Dispatcher, FixInvoker, Notifier};
pub use crate::engine::{Admission, SkipReason, TriageEngine, TriageJob, TriageResult, Trigger};
pub use crate::error::{
    CliError, ConfigError, DispatchError, ProviderError, SchemaError, TriageError,
};
pub use crate::events::{parse_trigger, InboundEvent, Issue, TRIGGER_TOKEN};
pub use crate::metrics::{Metrics, MetricsSnapshot};
pub use crate::policy::{PolicyStore, RepoPolicy};
