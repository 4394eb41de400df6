use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_URI_SCHEME: &str = "deskagent";
pub const DEFAULT_FLOW_HOST_EXE: &str =
    r"C:\Program Files (x86)\Power Automate Desktop\PAD.Console.Host.exe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FolderSetMode {
    #[default]
    TabsPrefer,
    Windows,
}

impl FolderSetMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TabsPrefer => "tabs_prefer",
            Self::Windows => "windows",
        }
    }
}

/// Timing and matching knobs for the Explorer tab heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TabSettings {
    #[serde(default)]
    pub folder_set_mode: FolderSetMode,
    #[serde(default = "default_first_window_wait_ms")]
    pub first_window_wait_ms: u64,
    #[serde(default = "default_tab_create_wait_ms")]
    pub tab_create_wait_ms: u64,
    #[serde(default = "default_navigate_wait_ms")]
    pub navigate_wait_ms: u64,
    #[serde(default = "default_tab_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_tab_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    #[serde(default = "default_home_labels")]
    pub home_labels: Vec<String>,
}

impl Default for TabSettings {
    fn default() -> Self {
        Self {
            folder_set_mode: FolderSetMode::default(),
            first_window_wait_ms: default_first_window_wait_ms(),
            tab_create_wait_ms: default_tab_create_wait_ms(),
            navigate_wait_ms: default_navigate_wait_ms(),
            poll_interval_ms: default_tab_poll_interval_ms(),
            poll_timeout_ms: default_tab_poll_timeout_ms(),
            home_labels: default_home_labels(),
        }
    }
}

impl TabSettings {
    /// All waits zeroed and a single poll attempt; used by tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            first_window_wait_ms: 0,
            tab_create_wait_ms: 0,
            navigate_wait_ms: 0,
            poll_interval_ms: 0,
            poll_timeout_ms: 0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub portal_url: String,
    #[serde(default)]
    pub machine_key: String,
    #[serde(default = "default_poll_interval_sec")]
    pub poll_interval_sec: u64,
    #[serde(default = "default_heartbeat_interval_sec")]
    pub heartbeat_interval_sec: u64,
    #[serde(default = "default_execution_timeout_sec")]
    pub execution_timeout_sec: u64,
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_interpreter_path")]
    pub interpreter_path: String,
    #[serde(default)]
    pub scripts_base_path: Option<PathBuf>,
    #[serde(default = "default_flow_host_exe")]
    pub flow_host_exe: String,
    #[serde(default)]
    pub cloud_root_folder: Option<String>,
    #[serde(default)]
    pub tabs: TabSettings,
}

impl AgentConfig {
    pub fn new(portal_url: impl Into<String>, machine_key: impl Into<String>) -> Self {
        Self {
            portal_url: portal_url.into(),
            machine_key: machine_key.into(),
            poll_interval_sec: default_poll_interval_sec(),
            heartbeat_interval_sec: default_heartbeat_interval_sec(),
            execution_timeout_sec: default_execution_timeout_sec(),
            request_timeout_sec: default_request_timeout_sec(),
            log_dir: None,
            interpreter_path: default_interpreter_path(),
            scripts_base_path: None,
            flow_host_exe: default_flow_host_exe(),
            cloud_root_folder: None,
            tabs: TabSettings::default(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        super::validate::validate_agent_config(self)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.portal_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Where flow runs post their completion when the task carries no URL.
    pub fn default_callback_url(&self) -> String {
        self.endpoint("api/runs/callback")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_sec)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_sec)
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_sec)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }
}

/// The subset of the config file the URI helper reads. Unlike the agent,
/// the helper never requires portal credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HelperConfig {
    #[serde(default = "default_uri_scheme")]
    pub uri_scheme: String,
    #[serde(default)]
    pub cloud_root_folder: Option<String>,
    #[serde(default)]
    pub tabs: TabSettings,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            uri_scheme: default_uri_scheme(),
            cloud_root_folder: None,
            tabs: TabSettings::default(),
        }
    }
}

impl HelperConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

fn default_poll_interval_sec() -> u64 {
    10
}

fn default_heartbeat_interval_sec() -> u64 {
    30
}

fn default_execution_timeout_sec() -> u64 {
    3600
}

fn default_request_timeout_sec() -> u64 {
    30
}

fn default_interpreter_path() -> String {
    "python".to_string()
}

fn default_flow_host_exe() -> String {
    DEFAULT_FLOW_HOST_EXE.to_string()
}

fn default_uri_scheme() -> String {
    DEFAULT_URI_SCHEME.to_string()
}

fn default_first_window_wait_ms() -> u64 {
    800
}

fn default_tab_create_wait_ms() -> u64 {
    500
}

fn default_navigate_wait_ms() -> u64 {
    300
}

fn default_tab_poll_interval_ms() -> u64 {
    100
}

fn default_tab_poll_timeout_ms() -> u64 {
    3000
}

fn default_home_labels() -> Vec<String> {
    vec!["Home".to_string(), "ホーム".to_string()]
}
