use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_ENV: &str = "DESKAGENT_CONFIG_DIR";
pub const GENERIC_CONFIG_FILE_NAME: &str = "config.yaml";
pub const HELPER_LOG_FILE_NAME: &str = "deskagent-helper.log";
pub const AGENT_LOG_FILE_NAME: &str = "agent.log";

/// Machine identity sent with heartbeats and used to pick the override file.
pub fn machine_hostname() -> String {
    ["COMPUTERNAME", "HOSTNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn machine_config_file_name(hostname: &str) -> String {
    format!("config-{}.yaml", hostname.trim().to_uppercase())
}

/// Machine-specific file first, generic file second.
pub fn config_file_candidates(dir: &Path, hostname: &str) -> [PathBuf; 2] {
    [
        dir.join(machine_config_file_name(hostname)),
        dir.join(GENERIC_CONFIG_FILE_NAME),
    ]
}

pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let exe = std::env::current_exe().map_err(|_| ConfigError::ExecutableDirUnavailable)?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or(ConfigError::ExecutableDirUnavailable)
}
