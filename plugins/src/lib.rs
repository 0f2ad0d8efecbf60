pub mod factory;
pub mod fix_agent;
pub mod github;
pub mod http;
pub mod notifier;
pub mod provider;
pub mod services;

pub use services::PluginServicesFactory;
