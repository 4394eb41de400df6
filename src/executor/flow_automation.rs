use super::process::spawn_shell_command;
use super::{ExecError, ExecutionResult};
use crate::config::AgentConfig;
use crate::portal::Task;
use crate::shared::RuntimeLog;
use crate::shell::ShellLauncher;

pub const FLOW_URI_PREFIX: &str = "ms-powerautomate:";

/// `workflowName` query value of a flow URI, percent-decoded.
pub fn flow_name_from_uri(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once("workflowName=")?;
    let raw = rest.split('&').next().unwrap_or_default();
    if raw.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}

pub fn render_command_template(
    template: &str,
    run_token: &str,
    run_id: &str,
    callback_url: &str,
) -> String {
    template
        .replace("{{run_token}}", run_token)
        .replace("{{run_id}}", run_id)
        .replace("{{callback_url}}", callback_url)
}

/// Starts a desktop flow. Flows started from a command line finish
/// asynchronously and post their own result, so they report `running`.
pub fn run_flow(
    task: &Task,
    config: &AgentConfig,
    launcher: &dyn ShellLauncher,
    log: &RuntimeLog,
) -> Result<ExecutionResult, ExecError> {
    if let Some(target) = task.target().filter(|t| t.starts_with(FLOW_URI_PREFIX)) {
        log.info("flow.uri", &format!("starting flow via {target}"));
        launcher.open_uri(target)?;
        let summary = match flow_name_from_uri(target) {
            Some(name) => format!("PAD flow started: {name}"),
            None => "PAD flow started".to_string(),
        };
        return Ok(ExecutionResult::success(summary));
    }

    let command = match (task.run_config_str("command"), task.run_config_str("flow_name")) {
        (Some(template), _) => {
            let callback_url = task
                .callback_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| config.default_callback_url());
            render_command_template(
                template,
                task.run_token.as_deref().unwrap_or_default(),
                &task.run_id,
                &callback_url,
            )
        }
        (None, Some(flow_name)) => {
            format!("\"{}\" /flow \"{flow_name}\"", config.flow_host_exe)
        }
        (None, None) => {
            return Err(ExecError::not_configured(
                "PAD target URL, flow_name, or command not configured",
            ))
        }
    };

    log.info("flow.command", &command);
    spawn_shell_command(&command)?;
    Ok(ExecutionResult::running(
        "PAD flow started, waiting for callback",
    ))
}
