use std::sync::Arc;

use tokio::sync::broadcast;
use triage_core::api::{spawn_sweeper, AppConfig, CliError, SystemClock};

use super::build_engine;
use super::cli::ServeArgs;
use crate::http::{start_server, AppState, ServerConfig};

/// 处理 serve 命令
pub async fn handle_serve(args: ServeArgs, cfg: AppConfig) -> Result<(), CliError> {
    let host = args.host.unwrap_or_else(|| cfg.server.host.clone());
    let port = args.port.unwrap_or(cfg.server.port);

    if cfg
        .server
        .webhook_secret
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        tracing::warn!("webhook_secret is not set; webhook signatures will not be verified");
    }
    if cfg.repositories.is_empty() {
        tracing::warn!("no repositories configured; every event will be skipped");
    }

    let engine = build_engine(&cfg)?;
    let (shutdown_tx, _) = broadcast::channel(1);

    let sweeper = spawn_sweeper(
        engine.dedup().clone(),
        Arc::new(SystemClock),
        cfg.dedup.sweep_interval(),
        shutdown_tx.subscribe(),
    );

    tracing::info!(
        repositories = engine.policies().len(),
        dedup_ttl_secs = cfg.dedup.ttl_secs,
        "Starting triage relay on {}:{}",
        host,
        port
    );

    let state = AppState::new(engine, cfg.server.webhook_secret.clone(), shutdown_tx.clone());
    let result = start_server(ServerConfig { host, port }, state).await;

    let _ = shutdown_tx.send(());
    if let Err(e) = sweeper.await {
        tracing::warn!("dedup sweeper ended abnormally: {}", e);
    }
    result
}
