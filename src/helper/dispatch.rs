use super::payload::{ExcelOpenMode, HelperPayload};
use crate::executor::{ExecError, LocalActions};
use crate::shared::RuntimeLog;
use crate::tabs::TabOutcome;
use std::path::PathBuf;

/// The desktop operations a helper payload can ask for.
pub trait HelperActions {
    fn open_file(&self, path: &str) -> Result<(), ExecError>;
    fn open_latest_excel(&self, folder: &str) -> Result<PathBuf, ExecError>;
    fn open_folder(&self, path: &str) -> Result<(), ExecError>;
    fn open_folders(&self, paths: &[String]) -> TabOutcome;
    fn run_exe(&self, path: &str) -> Result<(), ExecError>;
    fn run_bat(&self, path: &str) -> Result<(), ExecError>;
    fn open_shortcut(&self, path: &str) -> Result<(), ExecError>;
    fn open_url(&self, url: &str) -> Result<(), ExecError>;
}

impl HelperActions for LocalActions<'_> {
    fn open_file(&self, path: &str) -> Result<(), ExecError> {
        self.open_path(path).map(|_| ())
    }

    fn open_latest_excel(&self, folder: &str) -> Result<PathBuf, ExecError> {
        LocalActions::open_latest_excel(self, folder)
    }

    fn open_folder(&self, path: &str) -> Result<(), ExecError> {
        self.open_path(path).map(|_| ())
    }

    fn open_folders(&self, paths: &[String]) -> TabOutcome {
        self.open_folder_set(paths)
    }

    fn run_exe(&self, path: &str) -> Result<(), ExecError> {
        self.run_executable(path).map(|_| ())
    }

    fn run_bat(&self, path: &str) -> Result<(), ExecError> {
        self.run_batch_in_console(path).map(|_| ())
    }

    fn open_shortcut(&self, path: &str) -> Result<(), ExecError> {
        self.open_path(path).map(|_| ())
    }

    fn open_url(&self, url: &str) -> Result<(), ExecError> {
        LocalActions::open_url(self, url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Done(String),
    Skipped(String),
    Failed(String),
}

fn finish(log: &RuntimeLog, action: &str, result: Result<String, ExecError>) -> DispatchOutcome {
    match result {
        Ok(done) => {
            log.info("helper.done", &format!("{action}: {done}"));
            DispatchOutcome::Done(done)
        }
        Err(err) => {
            log.error("helper.failed", &format!("{action}: {err}"));
            DispatchOutcome::Failed(err.to_string())
        }
    }
}

fn skipped(log: &RuntimeLog, action: &str, reason: &str) -> DispatchOutcome {
    log.warn("helper.skipped", &format!("{action}: {reason}"));
    DispatchOutcome::Skipped(reason.to_string())
}

fn required<'p>(value: &'p Option<String>) -> Option<&'p str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub fn dispatch_payload(
    payload: &HelperPayload,
    actions: &dyn HelperActions,
    log: &RuntimeLog,
) -> DispatchOutcome {
    let action = payload.action();
    log.info("helper.action", action);

    match payload {
        HelperPayload::OpenFile {
            path,
            excel_open_mode,
            excel_folder_path,
        } => match excel_open_mode {
            Some(ExcelOpenMode::FolderLatestCreated) => match required(excel_folder_path) {
                Some(folder) => finish(
                    log,
                    action,
                    actions
                        .open_latest_excel(folder)
                        .map(|file| format!("opened latest {}", file.display())),
                ),
                None => skipped(log, action, "no excel_folder_path"),
            },
            Some(ExcelOpenMode::FolderPick) => {
                skipped(log, action, "folder_pick needs an interactive file dialog")
            }
            _ => match required(path) {
                Some(path) => finish(
                    log,
                    action,
                    actions.open_file(path).map(|_| format!("opened {path}")),
                ),
                None => skipped(log, action, "no path"),
            },
        },
        HelperPayload::OpenFolder { path } => match required(path) {
            Some(path) => finish(
                log,
                action,
                actions.open_folder(path).map(|_| format!("opened {path}")),
            ),
            None => skipped(log, action, "no path"),
        },
        HelperPayload::OpenFolders { paths } => {
            if paths.is_empty() {
                return skipped(log, action, "no paths");
            }
            let outcome = actions.open_folders(paths);
            finish(
                log,
                action,
                Ok(format!(
                    "tabs_opened={} windows_fallback={}",
                    outcome.tabs_opened, outcome.windows_fallback
                )),
            )
        }
        HelperPayload::RunExe { path } => match required(path) {
            Some(path) => finish(
                log,
                action,
                actions.run_exe(path).map(|_| format!("started {path}")),
            ),
            None => skipped(log, action, "no path"),
        },
        HelperPayload::RunBat { path } => match required(path) {
            Some(path) => finish(
                log,
                action,
                actions.run_bat(path).map(|_| format!("started {path}")),
            ),
            None => skipped(log, action, "no path"),
        },
        HelperPayload::OpenShortcut { path } => match required(path) {
            Some(path) => finish(
                log,
                action,
                actions.open_shortcut(path).map(|_| format!("opened {path}")),
            ),
            None => skipped(log, action, "no path"),
        },
        HelperPayload::OpenUrl { url } => match required(url) {
            Some(url) => finish(
                log,
                action,
                actions.open_url(url).map(|_| format!("opened {url}")),
            ),
            None => skipped(log, action, "no url"),
        },
    }
}
