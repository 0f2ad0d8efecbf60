use std::sync::Arc;

use anyhow::{Context, Result};

use triage_core::api::{
    AnalysisProvider, AppConfig, Commenter, FixInvoker, Notifier,
};

use crate::fix_agent::CommandFixInvoker;
use crate::github::GithubCommenter;
use crate::notifier::WebhookNotifier;
use crate::provider::ChatCompletionsProvider;

pub fn build_provider(cfg: &AppConfig) -> Result<Arc<dyn AnalysisProvider>> {
    if cfg.classifier.api_key.trim().is_empty() {
        tracing::warn!("classifier api_key is empty; requests are sent without authorization");
    }
    let provider = ChatCompletionsProvider::new(&cfg.classifier)
        .context("failed to build classifier client")?;
    Ok(Arc::new(provider))
}

pub fn build_notifier(cfg: &AppConfig) -> Result<Arc<dyn Notifier>> {
    let notifier =
        WebhookNotifier::new(&cfg.notifier).context("failed to build notifier client")?;
    Ok(Arc::new(notifier))
}

pub fn build_commenter(cfg: &AppConfig) -> Result<Arc<dyn Commenter>> {
    if cfg.github.token.trim().is_empty() {
        tracing::warn!("github token is empty; clarification comments will likely be rejected");
    }
    let commenter =
        GithubCommenter::new(&cfg.github).context("failed to build github client")?;
    Ok(Arc::new(commenter))
}

pub fn build_fix_invoker(cfg: &AppConfig) -> Arc<dyn FixInvoker> {
    Arc::new(CommandFixInvoker::new(&cfg.fix_agent))
}
