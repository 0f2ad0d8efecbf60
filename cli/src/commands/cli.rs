use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "triage-relay",
    version,
    about = "Triage GitHub issues with an LLM and route them to a fix agent, a clarifying comment or a notification"
)]
pub struct Args {
    /// Config file path (default: $TRIAGE_RELAY_CONFIG, ~/.triage-relay/config.toml, ./triage-relay.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the webhook server.
    Serve(ServeArgs),
    /// Load and validate configuration, then print the repository policies.
    CheckConfig,
    /// Classify and decide one issue from the command line.
    Triage(TriageArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Overrides `[server].host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Overrides `[server].port`.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TriageArgs {
    /// Repository as owner/name.
    #[arg(long)]
    pub repo: String,

    #[arg(long)]
    pub issue: u64,

    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub body: String,

    #[arg(long, default_value = "cli")]
    pub author: String,

    /// Can be specified multiple times.
    #[arg(long = "label", action = clap::ArgAction::Append)]
    pub labels: Vec<String>,

    /// Execute the decision (fix agent, comment, notification). Bypasses the dedup cache.
    #[arg(long)]
    pub dispatch: bool,
}
