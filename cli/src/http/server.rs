//! HTTP服务器生命周期管理

use super::{
    middleware::{create_timeout_layer, create_trace_layer, request_logger},
    routes::create_router,
    AppState,
};
use axum::middleware;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};
use triage_core::api::CliError;

/// HTTP服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 启动HTTP服务器，直到收到 Ctrl+C / SIGTERM / 内部关闭信号
pub async fn start_server(config: ServerConfig, state: AppState) -> Result<(), CliError> {
    let router = create_router(state.clone());

    let app = router
        .layer(middleware::from_fn(request_logger))
        .layer(create_trace_layer())
        .layer(create_timeout_layer());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| CliError::Server(format!("invalid listen address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CliError::Server(format!("failed to bind {addr}: {e}")))?;
    info!("HTTP server listening on http://{}", addr);

    let shutdown_tx = state.shutdown_tx.clone();
    let mut shutdown_rx = state.shutdown_tx.subscribe();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C signal");
                }
                _ = shutdown_rx.recv() => {
                    info!("Received internal shutdown signal");
                }
                _ = wait_for_sigterm() => {
                    info!("Received SIGTERM signal");
                }
            }

            info!("Starting graceful shutdown...");
            // Stops the dedup sweeper and anything else subscribed.
            let _ = shutdown_tx.send(());
        })
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    info!("Server shutdown complete");
    Ok(())
}

/// 等待 SIGTERM 信号（Unix系统）
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Windows 系统不支持 SIGTERM，使用空操作
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
