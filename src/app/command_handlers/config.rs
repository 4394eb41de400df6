use crate::app::cli::GlobalOptions;
use crate::app::command_support::{config_dir, load_agent, mask_secret};
use crate::config::machine_hostname;
use std::path::Path;

fn optional_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_else(|| "(unset)".to_string())
}

pub fn cmd_config(options: &GlobalOptions) -> Result<String, String> {
    let dir = config_dir(options)?;
    let hostname = machine_hostname();
    let loaded = load_agent(&dir, &hostname)?;
    let config = &loaded.config;

    Ok([
        format!("config_file={}", loaded.path.display()),
        format!("hostname={hostname}"),
        format!("portal_url={}", config.portal_url),
        format!("machine_key={}", mask_secret(&config.machine_key)),
        format!("poll_interval_sec={}", config.poll_interval_sec),
        format!("heartbeat_interval_sec={}", config.heartbeat_interval_sec),
        format!("execution_timeout_sec={}", config.execution_timeout_sec),
        format!("request_timeout_sec={}", config.request_timeout_sec),
        format!("log_dir={}", optional_path(config.log_dir.as_deref())),
        format!("interpreter_path={}", config.interpreter_path),
        format!(
            "scripts_base_path={}",
            optional_path(config.scripts_base_path.as_deref())
        ),
        format!("flow_host_exe={}", config.flow_host_exe),
        format!(
            "cloud_root_folder={}",
            config.cloud_root_folder.as_deref().unwrap_or("(unset)")
        ),
        format!("folder_set_mode={}", config.tabs.folder_set_mode.as_str()),
    ]
    .join("\n"))
}
