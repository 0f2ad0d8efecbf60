//! HTTP服务器状态管理

use std::sync::Arc;

use tokio::sync::broadcast;
use triage_core::api::TriageEngine;

/// 应用状态（在所有handlers间共享）
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TriageEngine>,
    /// `None` disables signature verification.
    pub webhook_secret: Option<Arc<str>>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        engine: Arc<TriageEngine>,
        webhook_secret: Option<String>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let webhook_secret = webhook_secret
            .filter(|s| !s.trim().is_empty())
            .map(Arc::from);
        Self {
            engine,
            webhook_secret,
            shutdown_tx,
        }
    }
}
