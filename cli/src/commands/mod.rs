pub mod check_config;
pub mod cli;
pub mod serve;
pub mod triage;

use std::sync::Arc;

use triage_core::api::{
    AppConfig, CliError, DedupStore, MemoryDedupStore, PolicyStore, ServicesFactory, SystemClock,
    TriageEngine,
};
use triage_plugins::PluginServicesFactory;

/// Wires the engine with the plugin collaborators and an in-memory dedup cache.
pub(crate) fn build_engine(cfg: &AppConfig) -> Result<Arc<TriageEngine>, CliError> {
    let services = PluginServicesFactory.build_services(cfg)?;
    let dedup: Arc<dyn DedupStore> = Arc::new(MemoryDedupStore::new(
        cfg.dedup.ttl(),
        Arc::new(SystemClock),
    ));
    let policies = Arc::new(PolicyStore::from_config(&cfg.repositories));
    Ok(Arc::new(TriageEngine::new(
        services,
        policies,
        dedup,
        &cfg.timeouts,
    )))
}
