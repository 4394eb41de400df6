pub mod error;
pub mod load;
pub mod paths;
pub mod settings;
pub mod validate;

pub use error::ConfigError;
pub use load::{load_agent_config, load_helper_config, locate_config_file, LoadedConfig};
pub use paths::{
    config_file_candidates, default_config_dir, machine_config_file_name, machine_hostname,
    AGENT_LOG_FILE_NAME, CONFIG_DIR_ENV, GENERIC_CONFIG_FILE_NAME, HELPER_LOG_FILE_NAME,
};
pub use settings::{
    AgentConfig, FolderSetMode, HelperConfig, TabSettings, DEFAULT_FLOW_HOST_EXE,
    DEFAULT_URI_SCHEME,
};
pub use validate::validate_agent_config;
