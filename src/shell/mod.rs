//! Desktop shell seams: window automation for the Explorer tab heuristic and
//! the launcher used to open files, folders and URLs.

pub mod native;
#[cfg(windows)]
mod win32;

pub use native::NativeShell;

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const EXPLORER_WINDOW_CLASS: &str = "CabinetWClass";
pub const TAB_STRIP_CLASS: &str = "ShellTabWindowClass";
pub const WM_COMMAND: u32 = 0x0111;
/// Explorer's internal "new tab" command id.
pub const NEW_TAB_COMMAND: usize = 0xA21B;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// One tab or window as reported by the shell automation enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellWindowEntry {
    pub index: i32,
    pub handle: WindowHandle,
    pub location_url: String,
    pub location_name: String,
}

impl ShellWindowEntry {
    /// Identity used to tell pre-existing entries from new ones.
    pub fn key(&self) -> (i32, isize) {
        (self.index, self.handle.0)
    }

    pub fn is_unnavigated(&self) -> bool {
        self.location_url.is_empty()
    }
}

/// A top-level window seen while looking for a process's main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopLevelWindow {
    pub handle: WindowHandle,
    pub pid: u32,
    pub visible: bool,
    pub owned: bool,
}

/// First visible, unowned window belonging to `pid`.
pub fn main_window_of<I>(pid: u32, windows: I) -> Option<WindowHandle>
where
    I: IntoIterator<Item = TopLevelWindow>,
{
    windows
        .into_iter()
        .find(|window| window.pid == pid && window.visible && !window.owned)
        .map(|window| window.handle)
        .filter(|handle| !handle.is_null())
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("desktop automation is not available on this platform")]
    Unsupported,
    #[error("failed to launch {target}: {source}")]
    Launch {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open {target}: {reason}")]
    Open { target: String, reason: String },
    #[error("shell automation failed: {0}")]
    Automation(String),
}

/// Window-level operations the tab heuristic and process launching rely on.
pub trait WindowAutomation {
    fn foreground_window(&self) -> Option<WindowHandle>;

    fn window_class(&self, window: WindowHandle) -> Option<String>;

    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle>;

    fn list_automation_windows(&self) -> Result<Vec<ShellWindowEntry>, ShellError>;

    fn send_control_message(
        &self,
        window: WindowHandle,
        message: u32,
        command: usize,
    ) -> Result<isize, ShellError>;

    fn navigate(&self, entry: &ShellWindowEntry, path: &str) -> Result<(), ShellError>;

    /// Re-reads an entry after navigation; `None` when it has gone away.
    fn refresh_view(&self, entry: &ShellWindowEntry) -> Option<ShellWindowEntry>;

    fn find_window_by_title(&self, title_part: &str, timeout: Duration) -> Option<WindowHandle>;

    fn find_process_window(&self, pid: u32, timeout: Duration) -> Option<WindowHandle>;

    fn bring_to_front(&self, window: WindowHandle) -> bool;
}

pub trait ShellLauncher {
    /// Opens `path` in a new file-manager window.
    fn launch_explorer(&self, path: &str) -> Result<(), ShellError>;

    /// Opens a file or folder with its default handler.
    fn open_path(&self, path: &Path) -> Result<(), ShellError>;

    fn open_uri(&self, uri: &str) -> Result<(), ShellError>;
}
