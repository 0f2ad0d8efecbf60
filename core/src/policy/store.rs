use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{Priority, RepositoryConfig};

use super::SensitivePatterns;

#[derive(Debug, Clone)]
pub struct RepoPolicy {
    pub name: String,
    pub enabled: bool,
    pub auto_action_enabled: bool,
    pub sensitive_patterns: SensitivePatterns,
    pub priority: Priority,
    /// Passed through to the classifier prompt, never interpreted here.
    pub project_location: Option<String>,
}

impl RepoPolicy {
    /// Policy for repositories nobody configured.
    pub fn disabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: false,
            auto_action_enabled: false,
            sensitive_patterns: SensitivePatterns::default(),
            priority: Priority::default(),
            project_location: None,
        }
    }

    pub fn from_config(cfg: &RepositoryConfig) -> Self {
        Self {
            name: cfg.name.trim().to_string(),
            enabled: cfg.enabled,
            auto_action_enabled: cfg.auto_action_enabled,
            sensitive_patterns: SensitivePatterns::compile(&cfg.sensitive_patterns),
            priority: cfg.priority,
            project_location: cfg.project_location.clone(),
        }
    }
}

/// Read-only per-repository policies, loaded once at startup.
///
/// Names are matched ASCII case-insensitively, as GitHub treats `owner/repo`.
#[derive(Debug, Default)]
pub struct PolicyStore {
    by_name: HashMap<String, Arc<RepoPolicy>>,
}

impl PolicyStore {
    pub fn new(policies: impl IntoIterator<Item = RepoPolicy>) -> Self {
        let by_name = policies
            .into_iter()
            .map(|p| (p.name.to_ascii_lowercase(), Arc::new(p)))
            .collect();
        Self { by_name }
    }

    pub fn from_config(repos: &[RepositoryConfig]) -> Self {
        Self::new(repos.iter().map(RepoPolicy::from_config))
    }

    /// Total: unknown names yield a disabled policy, never an absent one.
    pub fn lookup(&self, repository: &str) -> Arc<RepoPolicy> {
        self.by_name
            .get(&repository.trim().to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| Arc::new(RepoPolicy::disabled(repository)))
    }

    /// Policies sorted by name.
    pub fn policies(&self) -> Vec<Arc<RepoPolicy>> {
        let mut all: Vec<_> = self.by_name.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(name: &str, auto: bool, patterns: &[&str]) -> RepositoryConfig {
        RepositoryConfig {
            name: name.to_string(),
            enabled: true,
            auto_action_enabled: auto,
            sensitive_patterns: patterns.iter().map(|s| s.to_string()).collect(),
            priority: Priority::High,
            project_location: Some("/srv/app".into()),
        }
    }

    #[test]
    fn test_lookup_known_repository() {
        let store = PolicyStore::from_config(&[cfg("acme/api", true, &["security"])]);
        let policy = store.lookup("acme/api");
        assert!(policy.enabled);
        assert!(policy.auto_action_enabled);
        assert_eq!(policy.priority, Priority::High);
        assert!(policy.sensitive_patterns.is_match("a Security hole"));
        assert_eq!(policy.project_location.as_deref(), Some("/srv/app"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let store = PolicyStore::from_config(&[cfg("Acme/API", false, &[])]);
        assert!(store.lookup("acme/api").enabled);
    }

    #[test]
    fn test_unknown_repository_is_disabled_default() {
        let store = PolicyStore::from_config(&[cfg("acme/api", true, &["x"])]);
        let policy = store.lookup("someone/else");
        assert!(!policy.enabled);
        assert!(!policy.auto_action_enabled);
        assert!(policy.sensitive_patterns.is_empty());
        assert_eq!(policy.name, "someone/else");
    }

    #[test]
    fn test_policies_sorted() {
        let store = PolicyStore::from_config(&[cfg("b/b", false, &[]), cfg("a/a", false, &[])]);
        let names: Vec<_> = store.policies().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["a/a", "b/b"]);
        assert_eq!(store.len(), 2);
    }
}
