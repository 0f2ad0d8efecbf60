mod load;
mod types;

pub use load::{
    apply_env_overrides, get_data_dir, load, load_from_path, resolve_config_path,
    CONFIG_PATH_ENV,
};
pub use types::{
    AppConfig, ClassifierConfig, DedupConfig, FixAgentConfig, GithubConfig, LoggingConfig,
    NotifierConfig, Priority, RepositoryConfig, ServerConfig, TimeoutsConfig,
};
