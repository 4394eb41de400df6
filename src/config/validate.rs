use super::{AgentConfig, ConfigError};

pub fn validate_agent_config(config: &AgentConfig) -> Result<(), ConfigError> {
    let portal_url = config.portal_url.trim();
    if portal_url.is_empty() {
        return Err(ConfigError::MissingKey("portal_url"));
    }
    if config.machine_key.trim().is_empty() {
        return Err(ConfigError::MissingKey("machine_key"));
    }
    if !(portal_url.starts_with("http://") || portal_url.starts_with("https://")) {
        return Err(ConfigError::Invalid(format!(
            "`portal_url` must start with http:// or https://, got `{portal_url}`"
        )));
    }

    for (key, value) in [
        ("poll_interval_sec", config.poll_interval_sec),
        ("heartbeat_interval_sec", config.heartbeat_interval_sec),
        ("execution_timeout_sec", config.execution_timeout_sec),
        ("request_timeout_sec", config.request_timeout_sec),
    ] {
        if value == 0 {
            return Err(ConfigError::Invalid(format!("`{key}` must be positive")));
        }
    }

    if config.interpreter_path.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "`interpreter_path` must be non-empty".to_string(),
        ));
    }

    if let Some(folder) = &config.cloud_root_folder {
        if folder.trim().is_empty() || folder.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(
                "`cloud_root_folder` must be a single folder name".to_string(),
            ));
        }
    }

    Ok(())
}
