use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub fix_agent: FixAgentConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    #[serde(default)]
    pub dedup: DedupConfig,

    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
}

impl AppConfig {
    /// Checks cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timeouts.validate()?;
        self.dedup.validate()?;

        let mut seen = HashSet::new();
        for repo in &self.repositories {
            let name = repo.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid(
                    "repository entry with empty name".to_string(),
                ));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "repository '{name}' configured more than once"
                )));
            }
            if repo.sensitive_patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "repository '{name}' has an empty sensitive pattern"
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Shared secret for `X-Hub-Signature-256`. Unset disables verification.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            webhook_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "triage_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// OpenAI-compatible API root, e.g. "https://api.openai.com/v1".
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_classifier_model")]
    pub model: String,

    #[serde(default = "default_classifier_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: f32,
}

fn default_classifier_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_classifier_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_classifier_max_tokens() -> u32 {
    1024
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_classifier_base_url(),
            api_key: String::new(),
            model: default_classifier_model(),
            max_tokens: default_classifier_max_tokens(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_notifier_enabled")]
    pub enabled: bool,

    /// Incoming-webhook URL accepting `{"text": "..."}`.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_notifier_enabled() -> bool {
    true
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifier_enabled(),
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub token: String,

    #[serde(default = "default_github_user_agent")]
    pub user_agent: String,
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_github_user_agent() -> String {
    "triage-relay".to_string()
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
            token: String::new(),
            user_agent: default_github_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixAgentConfig {
    #[serde(default = "default_fix_agent_command")]
    pub command: String,

    /// Arguments; `{repo}` and `{issue}` are substituted per invocation.
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub workdir: Option<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_fix_agent_command() -> String {
    "ralph".to_string()
}

impl Default for FixAgentConfig {
    fn default() -> Self {
        Self {
            command: default_fix_agent_command(),
            args: vec![
                "--repo".to_string(),
                "{repo}".to_string(),
                "--issue".to_string(),
                "{issue}".to_string(),
            ],
            workdir: None,
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_classifier_timeout_ms")]
    pub classifier_ms: u64,

    #[serde(default = "default_notifier_timeout_ms")]
    pub notifier_ms: u64,

    #[serde(default = "default_commenter_timeout_ms")]
    pub commenter_ms: u64,

    #[serde(default = "default_fix_invoker_timeout_ms")]
    pub fix_invoker_ms: u64,
}

fn default_classifier_timeout_ms() -> u64 {
    60_000
}

fn default_notifier_timeout_ms() -> u64 {
    10_000
}

fn default_commenter_timeout_ms() -> u64 {
    15_000
}

fn default_fix_invoker_timeout_ms() -> u64 {
    120_000
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            classifier_ms: default_classifier_timeout_ms(),
            notifier_ms: default_notifier_timeout_ms(),
            commenter_ms: default_commenter_timeout_ms(),
            fix_invoker_ms: default_fix_invoker_timeout_ms(),
        }
    }
}

impl TimeoutsConfig {
    pub fn classifier(&self) -> Duration {
        Duration::from_millis(self.classifier_ms)
    }

    pub fn notifier(&self) -> Duration {
        Duration::from_millis(self.notifier_ms)
    }

    pub fn commenter(&self) -> Duration {
        Duration::from_millis(self.commenter_ms)
    }

    pub fn fix_invoker(&self) -> Duration {
        Duration::from_millis(self.fix_invoker_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            ("classifier_ms", self.classifier_ms),
            ("notifier_ms", self.notifier_ms),
            ("commenter_ms", self.commenter_ms),
            ("fix_invoker_ms", self.fix_invoker_ms),
        ];
        if let Some((name, _)) = all.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::Invalid(format!("timeouts.{name} must be > 0")));
        }
        // The fix invoker only confirms the agent started, but it is still the slowest call.
        if all[..3].iter().any(|(_, ms)| *ms >= self.fix_invoker_ms) {
            return Err(ConfigError::Invalid(
                "timeouts.fix_invoker_ms must be the longest timeout".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_dedup_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_dedup_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_dedup_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_dedup_sweep_interval_secs() -> u64 {
    60 * 60
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_dedup_ttl_secs(),
            sweep_interval_secs: default_dedup_sweep_interval_secs(),
        }
    }
}

impl DedupConfig {
    pub fn ttl(&self) -> chrono::Duration {
        let secs = self.ttl_secs.min((i64::MAX / 1_000) as u64) as i64;
        chrono::Duration::seconds(secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_secs == 0 {
            return Err(ConfigError::Invalid("dedup.ttl_secs must be > 0".into()));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "dedup.sweep_interval_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Full name, `owner/repo`.
    pub name: String,

    #[serde(default = "default_repository_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub auto_action_enabled: bool,

    /// Case-insensitive regexes; invalid regex syntax is matched literally.
    #[serde(default)]
    pub sensitive_patterns: Vec<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub project_location: Option<String>,
}

fn default_repository_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> RepositoryConfig {
        RepositoryConfig {
            name: name.to_string(),
            enabled: true,
            auto_action_enabled: false,
            sensitive_patterns: vec![],
            priority: Priority::Medium,
            project_location: None,
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [[repositories]]
            name = "acme/widgets"
            auto_action_enabled = true
            sensitive_patterns = ["security", "billing"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.timeouts.fix_invoker_ms, 120_000);
        assert_eq!(cfg.dedup.ttl_secs, 86_400);
        assert_eq!(cfg.repositories.len(), 1);
        assert!(cfg.repositories[0].enabled);
        assert_eq!(cfg.repositories[0].priority, Priority::Medium);
        cfg.validate().unwrap();
    }

    #[test]
    fn test_fix_invoker_timeout_must_be_longest() {
        let mut cfg = AppConfig::default();
        cfg.timeouts.fix_invoker_ms = cfg.timeouts.classifier_ms;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("fix_invoker_ms"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = AppConfig::default();
        cfg.timeouts.notifier_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_duplicate_repository_rejected_case_insensitively() {
        let mut cfg = AppConfig::default();
        cfg.repositories = vec![repo("acme/widgets"), repo("ACME/Widgets")];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_empty_sensitive_pattern_rejected() {
        let mut cfg = AppConfig::default();
        let mut r = repo("acme/widgets");
        r.sensitive_patterns = vec!["  ".to_string()];
        cfg.repositories = vec![r];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut cfg = AppConfig::default();
        cfg.dedup.ttl_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
