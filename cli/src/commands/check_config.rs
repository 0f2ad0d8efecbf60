use std::fmt::Write as _;

use triage_core::api::{AppConfig, PolicyStore};

/// Human-readable summary of the resolved configuration.
pub fn render(cfg: &AppConfig) -> String {
    let store = PolicyStore::from_config(&cfg.repositories);
    let mut out = String::new();
    let _ = writeln!(out, "server: {}:{}", cfg.server.host, cfg.server.port);
    let _ = writeln!(
        out,
        "webhook signature: {}",
        if cfg.server.webhook_secret.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            "verified"
        } else {
            "NOT verified"
        }
    );
    let _ = writeln!(out, "classifier: {} @ {}", cfg.classifier.model, cfg.classifier.base_url);
    let _ = writeln!(
        out,
        "notifier: {}",
        match (cfg.notifier.enabled, cfg.notifier.webhook_url.as_deref()) {
            (true, Some(url)) if !url.trim().is_empty() => "webhook",
            (true, _) => "log only (no webhook_url)",
            (false, _) => "disabled (log only)",
        }
    );
    let _ = writeln!(out, "fix agent: {} {}", cfg.fix_agent.command, cfg.fix_agent.args.join(" "));
    let _ = writeln!(
        out,
        "dedup: ttl {}s, sweep every {}s",
        cfg.dedup.ttl_secs, cfg.dedup.sweep_interval_secs
    );
    let _ = writeln!(out, "repositories ({}):", store.len());
    for p in store.policies() {
        let _ = writeln!(
            out,
            "  {}  enabled={} auto_action={} priority={} sensitive_patterns={}",
            p.name,
            p.enabled,
            p.auto_action_enabled,
            p.priority.as_str(),
            p.sensitive_patterns.len()
        );
    }
    out.trim_end().to_string()
}

pub fn handle_check_config(cfg: &AppConfig) -> i32 {
    println!("{}", render(cfg));
    println!("config ok");
    0
}
