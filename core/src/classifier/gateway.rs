use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::model::Classification;
use super::parse::parse_classification;
use super::prompt::build_prompt;
use crate::error::{ProviderError, TriageError};
use crate::events::Issue;
use crate::policy::RepoPolicy;

/// The external analysis service: prompt in, raw text out.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn complete(&self, prompt: String) -> anyhow::Result<String>;
}

/// Sends issues to the provider and validates what comes back. Nothing the
/// provider returns leaves this type without passing the schema check.
#[derive(Clone)]
pub struct ClassifierGateway {
    provider: Arc<dyn AnalysisProvider>,
    timeout: Duration,
}

impl ClassifierGateway {
    pub fn new(provider: Arc<dyn AnalysisProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn classify(
        &self,
        issue: &Issue,
        repository: &str,
        policy: &RepoPolicy,
    ) -> Result<Classification, TriageError> {
        let prompt = build_prompt(issue, repository, policy);
        tracing::debug!(
            stage = "classifier.request",
            repository = %repository,
            issue = issue.number,
            prompt_len = prompt.len()
        );

        let raw = match tokio::time::timeout(self.timeout, self.provider.complete(prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => return Err(ProviderError::Unreachable(format!("{err:#}")).into()),
            Err(_) => return Err(ProviderError::Timeout(self.timeout).into()),
        };

        tracing::debug!(
            stage = "classifier.response",
            repository = %repository,
            issue = issue.number,
            response_len = raw.len()
        );
        parse_classification(&raw)
    }
}
