use crate::app::cli::GlobalOptions;
use crate::config::{
    default_config_dir, load_agent_config, load_helper_config, AgentConfig, ConfigError,
    HelperConfig, LoadedConfig, AGENT_LOG_FILE_NAME,
};
use crate::shared::RuntimeLog;
use std::path::{Path, PathBuf};

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// `--config-dir` wins over the environment and the executable directory.
pub fn config_dir(options: &GlobalOptions) -> Result<PathBuf, String> {
    match &options.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => default_config_dir().map_err(map_config_err),
    }
}

pub fn load_agent(dir: &Path, hostname: &str) -> Result<LoadedConfig, String> {
    load_agent_config(dir, hostname).map_err(map_config_err)
}

/// Helper-side settings never stop a command: problems are logged and the
/// defaults apply.
pub fn load_helper_lenient(dir: &Path, hostname: &str, log: &RuntimeLog) -> HelperConfig {
    match load_helper_config(dir, hostname) {
        Ok(config) => config,
        Err(err) => {
            log.warn("config.fallback", &format!("{err}; using defaults"));
            HelperConfig::default()
        }
    }
}

pub fn agent_log(config: &AgentConfig) -> RuntimeLog {
    match &config.log_dir {
        Some(dir) => RuntimeLog::to_file(dir.join(AGENT_LOG_FILE_NAME)),
        None => RuntimeLog::disabled(),
    }
}

pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_show_at_most_four_characters() {
        assert_eq!(mask_secret("abcdefgh"), "abcd****");
        assert_eq!(mask_secret("abc"), "****");
    }

    #[test]
    fn explicit_config_dir_is_used_verbatim() {
        let options = GlobalOptions {
            config_dir: Some(PathBuf::from("/opt/deskagent")),
        };
        assert_eq!(
            config_dir(&options).expect("dir"),
            PathBuf::from("/opt/deskagent")
        );
    }

    #[test]
    fn agent_log_is_disabled_without_log_dir() {
        let mut config = AgentConfig::new("https://portal.example.com", "key");
        assert!(agent_log(&config).path().is_none());
        config.log_dir = Some(PathBuf::from("/var/log/deskagent"));
        assert_eq!(
            agent_log(&config).path(),
            Some(Path::new("/var/log/deskagent/agent.log"))
        );
    }
}
