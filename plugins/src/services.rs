//! ServicesFactory implementation: builds the four collaborators from configuration for the CLI.
use triage_core::api::{AppConfig, Services, ServicesFactory};

use crate::factory;

#[derive(Debug, Default)]
pub struct PluginServicesFactory;

impl ServicesFactory for PluginServicesFactory {
    fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services> {
        Ok(Services {
            provider: factory::build_provider(cfg)?,
            notifier: factory::build_notifier(cfg)?,
            commenter: factory::build_commenter(cfg)?,
            fix_invoker: factory::build_fix_invoker(cfg),
        })
    }
}
