use std::sync::Arc;

use crate::classifier::AnalysisProvider;
use crate::config::AppConfig;
use crate::dispatch::{Commenter, FixInvoker, Notifier};

/// The four external collaborators the engine talks to.
#[derive(Clone)]
pub struct Services {
    pub provider: Arc<dyn AnalysisProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub commenter: Arc<dyn Commenter>,
    pub fix_invoker: Arc<dyn FixInvoker>,
}

/// Builds concrete collaborators from configuration.
pub trait ServicesFactory: Send + Sync {
    fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services>;
}
