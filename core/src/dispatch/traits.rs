use async_trait::async_trait;

/// Delivers a formatted message to the humans watching the repositories.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> anyhow::Result<()>;
}

/// Posts a comment on an issue.
#[async_trait]
pub trait Commenter: Send + Sync {
    async fn comment(&self, repository: &str, issue: u64, body: &str) -> anyhow::Result<()>;
}

/// Starts an autonomous fix attempt. `Ok` means the attempt was accepted and
/// started, not that it finished.
#[async_trait]
pub trait FixInvoker: Send + Sync {
    async fn invoke(&self, repository: &str, issue: u64, instructions: &str) -> anyhow::Result<()>;
}
