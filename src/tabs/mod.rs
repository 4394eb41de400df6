//! Opens a set of folders as tabs of a single Explorer window, degrading to
//! one window per folder whenever the tab heuristic cannot confirm a step.

pub mod detect;

pub use detect::find_new_tab_view;

use crate::config::{FolderSetMode, TabSettings};
use crate::resolver::PathResolver;
use crate::shared::RuntimeLog;
use crate::shell::{
    ShellLauncher, ShellWindowEntry, WindowAutomation, WindowHandle, EXPLORER_WINDOW_CLASS,
    NEW_TAB_COMMAND, TAB_STRIP_CLASS, WM_COMMAND,
};
use std::fmt;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabOutcome {
    pub tabs_opened: usize,
    pub windows_fallback: usize,
}

/// Why a folder could not be opened as a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabFallback {
    NoForegroundWindow,
    NotExplorer(String),
    NoTabStrip,
    Automation(String),
    NewTabNotFound,
    Navigation(String),
}

impl fmt::Display for TabFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoForegroundWindow => write!(f, "no foreground window"),
            Self::NotExplorer(class) => write!(f, "foreground window is not Explorer ({class})"),
            Self::NoTabStrip => write!(f, "Explorer window has no tab strip"),
            Self::Automation(reason) => write!(f, "shell automation failed: {reason}"),
            Self::NewTabNotFound => write!(f, "new tab view not detected"),
            Self::Navigation(reason) => write!(f, "navigation failed: {reason}"),
        }
    }
}

pub struct TabEngine<'a> {
    automation: &'a dyn WindowAutomation,
    launcher: &'a dyn ShellLauncher,
    resolver: &'a PathResolver,
    settings: &'a TabSettings,
    log: &'a RuntimeLog,
}

impl<'a> TabEngine<'a> {
    pub fn new(
        automation: &'a dyn WindowAutomation,
        launcher: &'a dyn ShellLauncher,
        resolver: &'a PathResolver,
        settings: &'a TabSettings,
        log: &'a RuntimeLog,
    ) -> Self {
        Self {
            automation,
            launcher,
            resolver,
            settings,
            log,
        }
    }

    /// Opens `paths` the way `folder_set_mode` asks for.
    pub fn open_folder_set(&self, paths: &[String]) -> TabOutcome {
        self.log.info(
            "tabs.folder_set",
            &format!(
                "opening {} folders (mode={})",
                paths.len(),
                self.settings.folder_set_mode.as_str()
            ),
        );
        match self.settings.folder_set_mode {
            FolderSetMode::TabsPrefer => self.open_folders_in_tabs(paths),
            FolderSetMode::Windows => self.open_folders_in_windows(paths),
        }
    }

    pub fn open_folders_in_windows(&self, paths: &[String]) -> TabOutcome {
        let opened = self
            .resolver
            .resolve_all(paths)
            .iter()
            .filter(|path| self.open_separate_window(path))
            .count();
        TabOutcome {
            tabs_opened: 0,
            windows_fallback: opened,
        }
    }

    pub fn open_folders_in_tabs(&self, paths: &[String]) -> TabOutcome {
        let resolved = self.resolver.resolve_all(paths);
        let Some((first, rest)) = resolved.split_first() else {
            return TabOutcome::default();
        };

        if let Err(err) = self.launcher.launch_explorer(first) {
            self.log.warn(
                "tabs.first_window_failed",
                &format!("cannot open first window for {first}: {err}; opening separate windows"),
            );
            let opened = resolved
                .iter()
                .filter(|path| self.open_separate_window(path))
                .count();
            return TabOutcome {
                tabs_opened: 0,
                windows_fallback: opened,
            };
        }
        pause(self.settings.first_window_wait_ms);

        let mut outcome = TabOutcome {
            tabs_opened: 1,
            windows_fallback: 0,
        };
        for path in rest {
            match self.try_open_as_tab(path) {
                Ok(()) => outcome.tabs_opened += 1,
                Err(reason) => {
                    self.log.warn(
                        "tabs.fallback",
                        &format!("opening {path} as a separate window: {reason}"),
                    );
                    if self.open_separate_window(path) {
                        outcome.windows_fallback += 1;
                    }
                }
            }
        }

        self.log.info(
            "tabs.summary",
            &format!(
                "tabs={} windows={}",
                outcome.tabs_opened, outcome.windows_fallback
            ),
        );
        outcome
    }

    /// Adds a tab to the foreground Explorer window and navigates it to
    /// `path` (already resolved).
    pub fn try_open_as_tab(&self, path: &str) -> Result<(), TabFallback> {
        let window = self
            .automation
            .foreground_window()
            .ok_or(TabFallback::NoForegroundWindow)?;
        let class = self.automation.window_class(window).unwrap_or_default();
        if class != EXPLORER_WINDOW_CLASS {
            return Err(TabFallback::NotExplorer(class));
        }
        let tab_strip = self
            .automation
            .find_child_window(window, TAB_STRIP_CLASS)
            .ok_or(TabFallback::NoTabStrip)?;

        let before = self
            .automation
            .list_automation_windows()
            .map_err(|err| TabFallback::Automation(err.to_string()))?;
        self.automation
            .send_control_message(tab_strip, WM_COMMAND, NEW_TAB_COMMAND)
            .map_err(|err| TabFallback::Automation(err.to_string()))?;
        pause(self.settings.tab_create_wait_ms);

        let view = self.poll_for_new_view(&before, window)?;
        self.automation
            .navigate(&view, path)
            .map_err(|err| TabFallback::Navigation(err.to_string()))?;
        pause(self.settings.navigate_wait_ms);

        match self.automation.refresh_view(&view) {
            Some(after) => self.log.info(
                "tabs.opened",
                &format!(
                    "tab {} now at {} ({})",
                    after.index, after.location_url, after.location_name
                ),
            ),
            None => self.log.info(
                "tabs.opened",
                &format!("tab {} navigated to {path}", view.index),
            ),
        }
        Ok(())
    }

    fn poll_for_new_view(
        &self,
        before: &[ShellWindowEntry],
        window: WindowHandle,
    ) -> Result<ShellWindowEntry, TabFallback> {
        let deadline = Instant::now() + Duration::from_millis(self.settings.poll_timeout_ms);
        loop {
            if let Ok(current) = self.automation.list_automation_windows() {
                if let Some(view) =
                    find_new_tab_view(before, &current, window, &self.settings.home_labels)
                {
                    return Ok(view);
                }
            }
            if Instant::now() >= deadline {
                return Err(TabFallback::NewTabNotFound);
            }
            pause(self.settings.poll_interval_ms);
        }
    }

    fn open_separate_window(&self, path: &str) -> bool {
        match self.launcher.open_path(Path::new(path)) {
            Ok(()) => true,
            Err(err) => {
                self.log
                    .error("tabs.window_failed", &format!("cannot open {path}: {err}"));
                false
            }
        }
    }
}

fn pause(ms: u64) {
    if ms > 0 {
        thread::sleep(Duration::from_millis(ms));
    }
}
