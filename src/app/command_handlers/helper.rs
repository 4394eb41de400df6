use crate::app::cli::GlobalOptions;
use crate::app::command_support::{config_dir, load_helper_lenient};
use crate::config::{machine_hostname, HELPER_LOG_FILE_NAME};
use crate::executor::LocalActions;
use crate::helper::{handle_invocation, DispatchOutcome};
use crate::resolver::PathResolver;
use crate::shared::RuntimeLog;
use crate::shell::NativeShell;
use std::path::Path;

pub fn cmd_handle(options: &GlobalOptions, args: &[String]) -> Result<String, String> {
    let dir = config_dir(options)?;
    run_helper(&dir, args.first().map(String::as_str))
}

/// Shared by `deskagent handle` and the `deskagent-helper` binary. The log
/// lives next to the config files.
pub fn run_helper(config_dir: &Path, uri: Option<&str>) -> Result<String, String> {
    let log = RuntimeLog::to_file(config_dir.join(HELPER_LOG_FILE_NAME));
    let config = load_helper_lenient(config_dir, &machine_hostname(), &log);

    let resolver = PathResolver::new(config.cloud_root_folder.clone(), log.clone());
    let shell = NativeShell::new();
    let actions = LocalActions::new(&resolver, &shell, &shell, &config.tabs, &log);

    match handle_invocation(uri, &config.uri_scheme, &actions, &log) {
        Ok(DispatchOutcome::Done(message)) => Ok(message),
        Ok(DispatchOutcome::Skipped(reason)) => Ok(format!("skipped: {reason}")),
        Ok(DispatchOutcome::Failed(err)) => Err(err),
        Err(err) => Err(err.to_string()),
    }
}
