use super::{config_file_candidates, AgentConfig, ConfigError, HelperConfig};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AgentConfig,
    pub path: PathBuf,
}

/// Picks `config-<HOST>.yaml` when present, otherwise `config.yaml`.
pub fn locate_config_file(dir: &Path, hostname: &str) -> Result<PathBuf, ConfigError> {
    let candidates = config_file_candidates(dir, hostname);
    if let Some(found) = candidates.iter().find(|path| path.is_file()) {
        return Ok(found.clone());
    }
    let [machine, generic] = candidates;
    Err(ConfigError::NotFound {
        dir: dir.display().to_string(),
        machine_file: file_name(&machine),
        generic_file: file_name(&generic),
    })
}

pub fn load_agent_config(dir: &Path, hostname: &str) -> Result<LoadedConfig, ConfigError> {
    let path = locate_config_file(dir, hostname)?;
    let config = AgentConfig::from_path(&path)?;
    config.validate()?;
    Ok(LoadedConfig { config, path })
}

/// Missing files yield defaults; unreadable or malformed files are errors the
/// caller may log and then fall back on defaults.
pub fn load_helper_config(dir: &Path, hostname: &str) -> Result<HelperConfig, ConfigError> {
    match locate_config_file(dir, hostname) {
        Ok(path) => HelperConfig::from_path(&path),
        Err(ConfigError::NotFound { .. }) => Ok(HelperConfig::default()),
        Err(other) => Err(other),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
