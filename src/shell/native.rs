use super::{ShellError, ShellLauncher, ShellWindowEntry, WindowAutomation, WindowHandle};
use std::path::Path;
use std::time::Duration;

/// The host desktop. Window automation is only available on Windows; other
/// platforms report it as unsupported and open paths through the desktop's
/// default opener.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeShell;

impl NativeShell {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl WindowAutomation for NativeShell {
    fn foreground_window(&self) -> Option<WindowHandle> {
        super::win32::foreground_window()
    }

    fn window_class(&self, window: WindowHandle) -> Option<String> {
        super::win32::window_class(window)
    }

    fn find_child_window(&self, parent: WindowHandle, class_name: &str) -> Option<WindowHandle> {
        super::win32::find_child_window(parent, class_name)
    }

    fn list_automation_windows(&self) -> Result<Vec<ShellWindowEntry>, ShellError> {
        super::win32::list_shell_windows()
    }

    fn send_control_message(
        &self,
        window: WindowHandle,
        message: u32,
        command: usize,
    ) -> Result<isize, ShellError> {
        Ok(super::win32::send_message(window, message, command))
    }

    fn navigate(&self, entry: &ShellWindowEntry, path: &str) -> Result<(), ShellError> {
        super::win32::navigate(entry, path)
    }

    fn refresh_view(&self, entry: &ShellWindowEntry) -> Option<ShellWindowEntry> {
        super::win32::list_shell_windows()
            .ok()?
            .into_iter()
            .find(|candidate| candidate.key() == entry.key())
    }

    fn find_window_by_title(&self, title_part: &str, timeout: Duration) -> Option<WindowHandle> {
        super::win32::poll_for_window(timeout, || super::win32::window_with_title(title_part))
    }

    fn find_process_window(&self, pid: u32, timeout: Duration) -> Option<WindowHandle> {
        super::win32::poll_for_window(timeout, || super::win32::window_of_process(pid))
    }

    fn bring_to_front(&self, window: WindowHandle) -> bool {
        super::win32::bring_to_front(window)
    }
}

#[cfg(windows)]
impl ShellLauncher for NativeShell {
    fn launch_explorer(&self, path: &str) -> Result<(), ShellError> {
        std::process::Command::new("explorer.exe")
            .arg(path)
            .spawn()
            .map(|_| ())
            .map_err(|source| ShellError::Launch {
                target: path.to_string(),
                source,
            })
    }

    fn open_path(&self, path: &Path) -> Result<(), ShellError> {
        super::win32::shell_open(&path.to_string_lossy())
    }

    fn open_uri(&self, uri: &str) -> Result<(), ShellError> {
        super::win32::shell_open(uri)
    }
}

#[cfg(not(windows))]
impl WindowAutomation for NativeShell {
    fn foreground_window(&self) -> Option<WindowHandle> {
        None
    }

    fn window_class(&self, _window: WindowHandle) -> Option<String> {
        None
    }

    fn find_child_window(&self, _parent: WindowHandle, _class_name: &str) -> Option<WindowHandle> {
        None
    }

    fn list_automation_windows(&self) -> Result<Vec<ShellWindowEntry>, ShellError> {
        Err(ShellError::Unsupported)
    }

    fn send_control_message(
        &self,
        _window: WindowHandle,
        _message: u32,
        _command: usize,
    ) -> Result<isize, ShellError> {
        Err(ShellError::Unsupported)
    }

    fn navigate(&self, _entry: &ShellWindowEntry, _path: &str) -> Result<(), ShellError> {
        Err(ShellError::Unsupported)
    }

    fn refresh_view(&self, _entry: &ShellWindowEntry) -> Option<ShellWindowEntry> {
        None
    }

    fn find_window_by_title(&self, _title_part: &str, _timeout: Duration) -> Option<WindowHandle> {
        None
    }

    fn find_process_window(&self, _pid: u32, _timeout: Duration) -> Option<WindowHandle> {
        None
    }

    fn bring_to_front(&self, _window: WindowHandle) -> bool {
        false
    }
}

#[cfg(not(windows))]
impl ShellLauncher for NativeShell {
    fn launch_explorer(&self, _path: &str) -> Result<(), ShellError> {
        Err(ShellError::Unsupported)
    }

    fn open_path(&self, path: &Path) -> Result<(), ShellError> {
        spawn_opener(&path.to_string_lossy())
    }

    fn open_uri(&self, uri: &str) -> Result<(), ShellError> {
        spawn_opener(uri)
    }
}

#[cfg(not(windows))]
fn spawn_opener(target: &str) -> Result<(), ShellError> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    std::process::Command::new(opener)
        .arg(target)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|source| ShellError::Launch {
            target: target.to_string(),
            source,
        })
}
