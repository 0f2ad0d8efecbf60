use std::path::{Path, PathBuf};

use super::types::AppConfig;
use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TRIAGE_RELAY_CONFIG";

const LOCAL_CONFIG_FILE: &str = "triage-relay.toml";

/// Default data directory: ~/.triage-relay
pub fn get_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".triage-relay"))
}

/// Resolves which file to load. `None` means "no file, use defaults".
///
/// Priority: explicit path, `$TRIAGE_RELAY_CONFIG`, `~/.triage-relay/config.toml`,
/// `./triage-relay.toml`.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    if let Some(v) = lookup(CONFIG_PATH_ENV).filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(v.trim()));
    }

    if let Some(home_cfg) = get_data_dir().map(|d| d.join("config.toml")) {
        if home_cfg.exists() {
            return Some(home_cfg);
        }
    }

    let local = Path::new(LOCAL_CONFIG_FILE);
    local.exists().then(|| local.to_path_buf())
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Secrets may come from the environment instead of the file. Applied once at load.
pub fn apply_env_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("TRIAGE_WEBHOOK_SECRET") {
        cfg.server.webhook_secret = Some(v);
    }
    if let Some(v) = non_empty("TRIAGE_LLM_API_KEY") {
        cfg.classifier.api_key = v;
    }
    if let Some(v) = non_empty("TRIAGE_NOTIFY_WEBHOOK_URL") {
        cfg.notifier.webhook_url = Some(v);
    }
    if let Some(v) = non_empty("GITHUB_TOKEN") {
        cfg.github.token = v;
    }
}

/// Loads, applies environment overrides and validates.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let env = |key: &str| std::env::var(key).ok();

    let mut cfg = match resolve_config_path(explicit, env) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_from_path(&path)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, env);
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_from_path_reads_repositories() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [classifier]
            model = "gpt-4.1"

            [[repositories]]
            name = "acme/api"
            auto_action_enabled = true
            project_location = "/srv/acme/api"
            "#
        )
        .unwrap();

        let cfg = load_from_path(file.path()).unwrap();
        assert_eq!(cfg.classifier.model, "gpt-4.1");
        assert_eq!(cfg.repositories[0].name, "acme/api");
        assert_eq!(
            cfg.repositories[0].project_location.as_deref(),
            Some("/srv/acme/api")
        );
    }

    #[test]
    fn test_load_from_path_reports_parse_error_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let err = load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides_ignore_blank_values() {
        let env: HashMap<&str, &str> = [
            ("TRIAGE_WEBHOOK_SECRET", "s3cret"),
            ("TRIAGE_LLM_API_KEY", "   "),
            ("GITHUB_TOKEN", "ghp_x"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.classifier.api_key = "from-file".to_string();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.server.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(cfg.classifier.api_key, "from-file");
        assert_eq!(cfg.github.token, "ghp_x");
        assert!(cfg.notifier.webhook_url.is_none());
    }

    #[test]
    fn test_explicit_path_wins_over_env() {
        let explicit = Path::new("/etc/triage.toml");
        let resolved = resolve_config_path(Some(explicit), |_| Some("/tmp/other.toml".into()));
        assert_eq!(resolved, Some(explicit.to_path_buf()));

        let resolved = resolve_config_path(None, |k| {
            (k == CONFIG_PATH_ENV).then(|| "/tmp/other.toml".to_string())
        });
        assert_eq!(resolved, Some(PathBuf::from("/tmp/other.toml")));
    }
}
