use super::process::{parent_dir, spawn_console, spawn_detached, ProcessSpec};
use super::ExecError;
use crate::config::TabSettings;
use crate::resolver::PathResolver;
use crate::shared::RuntimeLog;
use crate::shell::{ShellLauncher, WindowAutomation};
use crate::tabs::{TabEngine, TabOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const FOREGROUND_TIMEOUT: Duration = Duration::from_secs(10);
pub const EXCEL_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "xlsm"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedPath {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl OpenedPath {
    pub fn display_name(&self) -> String {
        file_name(&self.path)
    }
}

/// Desktop actions shared by the task executors and the URI helper. Every
/// path argument goes through the resolver first.
#[derive(Clone, Copy)]
pub struct LocalActions<'a> {
    resolver: &'a PathResolver,
    automation: &'a dyn WindowAutomation,
    launcher: &'a dyn ShellLauncher,
    tabs: &'a TabSettings,
    log: &'a RuntimeLog,
}

impl<'a> LocalActions<'a> {
    pub fn new(
        resolver: &'a PathResolver,
        automation: &'a dyn WindowAutomation,
        launcher: &'a dyn ShellLauncher,
        tabs: &'a TabSettings,
        log: &'a RuntimeLog,
    ) -> Self {
        Self {
            resolver,
            automation,
            launcher,
            tabs,
            log,
        }
    }

    pub fn resolver(&self) -> &'a PathResolver {
        self.resolver
    }

    pub fn launcher(&self) -> &'a dyn ShellLauncher {
        self.launcher
    }

    pub fn tab_engine(&self) -> TabEngine<'a> {
        TabEngine::new(
            self.automation,
            self.launcher,
            self.resolver,
            self.tabs,
            self.log,
        )
    }

    fn existing(&self, raw: &str, kind: &'static str) -> Result<PathBuf, ExecError> {
        let resolved = PathBuf::from(self.resolver.resolve(raw));
        if resolved.exists() {
            Ok(resolved)
        } else {
            Err(ExecError::not_found(kind, resolved.display()))
        }
    }

    /// Opens a file or folder with its associated application.
    pub fn open_path(&self, raw: &str) -> Result<OpenedPath, ExecError> {
        let path = self.existing(raw, "Path")?;
        let is_dir = path.is_dir();
        self.log.info(
            "actions.open_path",
            &format!(
                "opening {} {}",
                if is_dir { "folder" } else { "file" },
                path.display()
            ),
        );
        self.launcher.open_path(&path)?;
        Ok(OpenedPath { path, is_dir })
    }

    /// Like `open_path`, then raises the window whose title carries the
    /// folder name or file stem.
    pub fn open_path_focused(&self, raw: &str) -> Result<OpenedPath, ExecError> {
        let opened = self.open_path(raw)?;
        let title_part = if opened.is_dir {
            file_name(&opened.path)
        } else {
            opened
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        if !title_part.is_empty() {
            match self
                .automation
                .find_window_by_title(&title_part, FOREGROUND_TIMEOUT)
            {
                Some(window) if self.automation.bring_to_front(window) => self.log.info(
                    "actions.foreground",
                    &format!("window for {title_part} brought to front"),
                ),
                _ => self.log.info(
                    "actions.foreground",
                    &format!("no window found for {title_part}"),
                ),
            }
        }
        Ok(opened)
    }

    pub fn open_folder_set(&self, paths: &[String]) -> TabOutcome {
        self.tab_engine().open_folder_set(paths)
    }

    /// Launches an executable detached, working directory set to its folder,
    /// and tries to bring its main window forward.
    pub fn run_executable(&self, raw: &str) -> Result<u32, ExecError> {
        let path = self.existing(raw, "EXE")?;
        let spec = ProcessSpec::new(
            path.to_string_lossy().into_owned(),
            Vec::new(),
            parent_dir(&path),
        );
        let pid = spawn_detached(&spec)?;
        self.log.info(
            "actions.exe_launched",
            &format!("launched {} (pid {pid})", path.display()),
        );

        match self.automation.find_process_window(pid, FOREGROUND_TIMEOUT) {
            Some(window) => {
                let raised = self.automation.bring_to_front(window);
                self.log.info(
                    "actions.foreground",
                    &format!("pid {pid} window raised={raised}"),
                );
            }
            None => self
                .log
                .info("actions.foreground", &format!("no window found for pid {pid}")),
        }
        Ok(pid)
    }

    /// Starts a batch file in a console of its own and returns immediately.
    pub fn run_batch_in_console(&self, raw: &str) -> Result<u32, ExecError> {
        let path = self.existing(raw, "BAT")?;
        let spec = batch_spec(&path);
        let pid = spawn_console(&spec)?;
        self.log.info(
            "actions.bat_started",
            &format!("{} (pid {pid})", spec.command_line()),
        );
        Ok(pid)
    }

    pub fn open_url(&self, url: &str) -> Result<(), ExecError> {
        self.log.info("actions.open_url", url);
        self.launcher.open_uri(url)?;
        Ok(())
    }

    /// Opens the most recently created spreadsheet in `raw_folder`.
    pub fn open_latest_excel(&self, raw_folder: &str) -> Result<PathBuf, ExecError> {
        let folder = PathBuf::from(self.resolver.resolve(raw_folder));
        if !folder.is_dir() {
            return Err(ExecError::not_found("Folder", folder.display()));
        }
        let latest = latest_excel_file(&folder)?
            .ok_or_else(|| ExecError::NoExcelFiles(folder.display().to_string()))?;
        self.log.info(
            "actions.excel_latest",
            &format!("latest spreadsheet: {}", latest.display()),
        );
        self.launcher.open_path(&latest)?;
        Ok(latest)
    }
}

/// `cmd /c <bat>` on Windows, `sh <script>` elsewhere.
pub fn batch_spec(path: &Path) -> ProcessSpec {
    let script = path.to_string_lossy().into_owned();
    let (program, args) = if cfg!(windows) {
        ("cmd", vec!["/c".to_string(), script])
    } else {
        ("sh", vec![script])
    };
    ProcessSpec::new(program, args, parent_dir(path))
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_excel_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| EXCEL_EXTENSIONS.contains(&ext.as_str()))
}

/// Newest spreadsheet by creation time, falling back to modification time
/// where the filesystem does not record creation.
pub fn latest_excel_file(folder: &Path) -> Result<Option<PathBuf>, ExecError> {
    let entries = fs::read_dir(folder).map_err(|source| ExecError::Io {
        context: format!("listing {}", folder.display()),
        source,
    })?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_excel_file(&path) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(stamp) = metadata.created().or_else(|_| metadata.modified()) else {
            continue;
        };
        if newest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            newest = Some((stamp, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn picks_newest_spreadsheet_and_ignores_other_files() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("old.xlsx"), "a").expect("write");
        thread::sleep(Duration::from_millis(50));
        fs::write(dir.path().join("notes.txt"), "b").expect("write");
        thread::sleep(Duration::from_millis(50));
        fs::write(dir.path().join("new.XLSM"), "c").expect("write");

        let latest = latest_excel_file(dir.path()).expect("list").expect("found");
        assert_eq!(latest.file_name().and_then(|n| n.to_str()), Some("new.XLSM"));
    }

    #[test]
    fn empty_folder_has_no_spreadsheet() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("readme.md"), "x").expect("write");
        assert!(latest_excel_file(dir.path()).expect("list").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn batch_runs_through_sh_off_windows() {
        let spec = batch_spec(Path::new("/jobs/nightly.sh"));
        assert_eq!(spec.command_line(), "sh /jobs/nightly.sh");
        assert_eq!(spec.cwd, PathBuf::from("/jobs"));
    }
}
