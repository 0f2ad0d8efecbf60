use std::collections::BTreeMap;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use triage_core::api::{FixAgentConfig, FixInvoker};

/// Starts the autonomous fix agent as a child process. The call returns once
/// the process is running; instructions go to its stdin and a failed write,
/// like the exit status, is only logged.
pub struct CommandFixInvoker {
    command: String,
    args: Vec<String>,
    workdir: Option<String>,
    env: BTreeMap<String, String>,
}

impl CommandFixInvoker {
    pub fn new(cfg: &FixAgentConfig) -> Self {
        Self {
            command: cfg.command.clone(),
            args: cfg.args.clone(),
            workdir: cfg.workdir.clone(),
            env: cfg.env.clone(),
        }
    }
}

fn expand_args(args: &[String], repository: &str, issue: u64) -> Vec<String> {
    let issue = issue.to_string();
    args.iter()
        .map(|a| a.replace("{repo}", repository).replace("{issue}", &issue))
        .collect()
}

#[async_trait]
impl FixInvoker for CommandFixInvoker {
    async fn invoke(&self, repository: &str, issue: u64, instructions: &str) -> Result<()> {
        let args = expand_args(&self.args, repository, issue);
        let mut cmd = Command::new(&self.command);
        cmd.args(&args)
            .envs(&self.env)
            .env("TRIAGE_REPOSITORY", repository)
            .env("TRIAGE_ISSUE", issue.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn fix agent `{}`", self.command))?;
        let pid = child.id();
        tracing::info!(
            stage = "fix_agent.spawned",
            command = %self.command,
            pid = ?pid,
            repository = %repository,
            issue = issue
        );

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(instructions.as_bytes()).await {
                Ok(()) => {
                    stdin.shutdown().await.ok();
                }
                Err(err) => tracing::warn!(
                    stage = "fix_agent.stdin",
                    pid = ?pid,
                    error = %err,
                    bytes = instructions.len(),
                    "fix agent did not accept instructions on stdin"
                ),
            }
        }

        let repository = repository.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => tracing::info!(
                    stage = "fix_agent.exit",
                    pid = ?pid,
                    repository = %repository,
                    issue = issue,
                    "fix agent finished"
                ),
                Ok(status) => tracing::warn!(
                    stage = "fix_agent.exit",
                    pid = ?pid,
                    repository = %repository,
                    issue = issue,
                    exit_code = ?status.code(),
                    "fix agent exited with failure"
                ),
                Err(err) => tracing::error!(
                    stage = "fix_agent.exit",
                    pid = ?pid,
                    error = %err,
                    "failed to wait for fix agent"
                ),
            }
        });

        Ok(())
    }
}
