use super::actions::LocalActions;
use super::{ExecError, ExecutionResult};
use crate::portal::Task;

const SPREADSHEET_URL_MARKER: &str = "docs.google.com/spreadsheets";

pub fn is_web_url(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

pub fn run_file_open(task: &Task, actions: &LocalActions<'_>) -> Result<ExecutionResult, ExecError> {
    if let Some(url) = task.target().filter(|target| is_web_url(target)) {
        actions.open_url(url)?;
        let summary = if url.contains(SPREADSHEET_URL_MARKER) {
            "Spreadsheet opened in browser"
        } else {
            "URL opened in browser"
        };
        return Ok(ExecutionResult::success(summary));
    }

    if let Some(paths) = task.folder_set_paths() {
        let outcome = actions.open_folder_set(&paths);
        return Ok(ExecutionResult::success(format!(
            "Folders opened: tabs={} windows={}",
            outcome.tabs_opened, outcome.windows_fallback
        )));
    }

    let target = task
        .target()
        .ok_or_else(|| ExecError::not_configured("Target not configured"))?;
    let opened = actions.open_path_focused(target)?;
    let kind = if opened.is_dir { "Folder" } else { "File" };
    Ok(ExecutionResult::success(format!(
        "{kind} opened: {}",
        opened.display_name()
    )))
}
