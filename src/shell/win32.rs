use super::{main_window_of, ShellError, ShellWindowEntry, TopLevelWindow, WindowHandle};
use std::thread;
use std::time::{Duration, Instant};
use windows::core::{Interface, BSTR, HSTRING, PCWSTR, VARIANT};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, WPARAM};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};
use windows::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows::Win32::UI::Shell::{IShellWindows, IWebBrowser2, ShellExecuteW, ShellWindows};
use windows::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, EnumChildWindows, EnumWindows, GetClassNameW, GetForegroundWindow, GetWindow,
    GetWindowTextW, GetWindowThreadProcessId, IsWindowVisible, SendMessageW, SetForegroundWindow,
    SetWindowPos, ShowWindow, GW_OWNER, HWND_NOTOPMOST, HWND_TOPMOST, SWP_NOMOVE, SWP_NOSIZE,
    SW_RESTORE, SW_SHOWNORMAL,
};

const POLL_STEP: Duration = Duration::from_millis(200);

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut _)
}

fn handle(hwnd: HWND) -> Option<WindowHandle> {
    let value = hwnd.0 as isize;
    (value != 0).then_some(WindowHandle(value))
}

pub(super) fn foreground_window() -> Option<WindowHandle> {
    handle(unsafe { GetForegroundWindow() })
}

pub(super) fn window_class(window: WindowHandle) -> Option<String> {
    let mut buffer = [0u16; 256];
    let len = unsafe { GetClassNameW(hwnd(window), &mut buffer) };
    (len > 0).then(|| String::from_utf16_lossy(&buffer[..len as usize]))
}

fn window_title(window: HWND) -> String {
    let mut buffer = [0u16; 512];
    let len = unsafe { GetWindowTextW(window, &mut buffer) };
    if len <= 0 {
        return String::new();
    }
    String::from_utf16_lossy(&buffer[..len as usize])
}

struct ChildSearch {
    class_name: String,
    found: Option<WindowHandle>,
}

unsafe extern "system" fn child_search_proc(window: HWND, state: LPARAM) -> BOOL {
    let search = &mut *(state.0 as *mut ChildSearch);
    if let Some(found) = handle(window) {
        if window_class(found).as_deref() == Some(search.class_name.as_str()) {
            search.found = Some(found);
            return BOOL(0);
        }
    }
    BOOL(1)
}

pub(super) fn find_child_window(parent: WindowHandle, class_name: &str) -> Option<WindowHandle> {
    let mut search = ChildSearch {
        class_name: class_name.to_string(),
        found: None,
    };
    unsafe {
        let _ = EnumChildWindows(
            hwnd(parent),
            Some(child_search_proc),
            LPARAM(&mut search as *mut ChildSearch as isize),
        );
    }
    search.found
}

fn top_level_windows() -> Vec<HWND> {
    unsafe extern "system" fn collect(window: HWND, state: LPARAM) -> BOOL {
        let windows = &mut *(state.0 as *mut Vec<HWND>);
        windows.push(window);
        BOOL(1)
    }

    let mut windows: Vec<HWND> = Vec::new();
    unsafe {
        let _ = EnumWindows(
            Some(collect),
            LPARAM(&mut windows as *mut Vec<HWND> as isize),
        );
    }
    windows
}

pub(super) fn window_with_title(title_part: &str) -> Option<WindowHandle> {
    let needle = title_part.to_lowercase();
    top_level_windows()
        .into_iter()
        .filter(|window| unsafe { IsWindowVisible(*window) }.as_bool())
        .find(|window| window_title(*window).to_lowercase().contains(&needle))
        .and_then(handle)
}

fn describe_top_level(window: HWND) -> Option<TopLevelWindow> {
    let mut pid = 0u32;
    unsafe { GetWindowThreadProcessId(window, Some(&mut pid)) };
    let owned = unsafe { GetWindow(window, GW_OWNER) }.is_ok_and(|owner| !owner.is_invalid());
    Some(TopLevelWindow {
        handle: handle(window)?,
        pid,
        visible: unsafe { IsWindowVisible(window) }.as_bool(),
        owned,
    })
}

pub(super) fn window_of_process(pid: u32) -> Option<WindowHandle> {
    main_window_of(
        pid,
        top_level_windows().into_iter().filter_map(describe_top_level),
    )
}

pub(super) fn poll_for_window<F>(timeout: Duration, mut probe: F) -> Option<WindowHandle>
where
    F: FnMut() -> Option<WindowHandle>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(found) = probe() {
            return Some(found);
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(POLL_STEP);
    }
}

pub(super) fn send_message(window: WindowHandle, message: u32, command: usize) -> isize {
    unsafe { SendMessageW(hwnd(window), message, WPARAM(command), LPARAM(0)) }.0
}

fn shell_windows() -> Result<IShellWindows, ShellError> {
    unsafe {
        // S_FALSE when the thread is already initialized is fine.
        let _ = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
        CoCreateInstance(&ShellWindows, None, CLSCTX_ALL)
            .map_err(|err| ShellError::Automation(err.to_string()))
    }
}

fn browser_at(windows: &IShellWindows, index: i32) -> Option<IWebBrowser2> {
    let item = unsafe { windows.Item(&VARIANT::from(index)) }.ok()?;
    item.cast::<IWebBrowser2>().ok()
}

fn entry_for(browser: &IWebBrowser2, index: i32) -> Option<ShellWindowEntry> {
    unsafe {
        let raw = browser.HWND().ok()?;
        Some(ShellWindowEntry {
            index,
            handle: WindowHandle(raw.0),
            location_url: browser.LocationURL().map(|s| s.to_string()).unwrap_or_default(),
            location_name: browser
                .LocationName()
                .map(|s| s.to_string())
                .unwrap_or_default(),
        })
    }
}

pub(super) fn list_shell_windows() -> Result<Vec<ShellWindowEntry>, ShellError> {
    let windows = shell_windows()?;
    let count = unsafe { windows.Count() }.map_err(|err| ShellError::Automation(err.to_string()))?;
    Ok((0..count)
        .filter_map(|index| {
            browser_at(&windows, index).and_then(|browser| entry_for(&browser, index))
        })
        .collect())
}

pub(super) fn navigate(entry: &ShellWindowEntry, path: &str) -> Result<(), ShellError> {
    let windows = shell_windows()?;
    let browser = browser_at(&windows, entry.index)
        .ok_or_else(|| ShellError::Automation(format!("view {} disappeared", entry.index)))?;
    let target = VARIANT::from(BSTR::from(path));
    let empty = VARIANT::default();
    unsafe { browser.Navigate2(&target, &empty, &empty, &empty, &empty) }
        .map_err(|err| ShellError::Automation(err.to_string()))
}

pub(super) fn shell_open(target: &str) -> Result<(), ShellError> {
    let file = HSTRING::from(target);
    let verb = HSTRING::from("open");
    let result = unsafe {
        ShellExecuteW(
            HWND::default(),
            &verb,
            &file,
            PCWSTR::null(),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };
    let code = result.0 as isize;
    if code > 32 {
        Ok(())
    } else {
        Err(ShellError::Open {
            target: target.to_string(),
            reason: format!("ShellExecute returned {code}"),
        })
    }
}

pub(super) fn bring_to_front(window: WindowHandle) -> bool {
    let target = hwnd(window);
    unsafe {
        let _ = ShowWindow(target, SW_RESTORE);

        let current_thread = GetCurrentThreadId();
        let foreground = GetForegroundWindow();
        let foreground_thread = if foreground.0.is_null() {
            0
        } else {
            GetWindowThreadProcessId(foreground, None)
        };
        let attached = foreground_thread != 0
            && foreground_thread != current_thread
            && AttachThreadInput(current_thread, foreground_thread, true).as_bool();

        let _ = BringWindowToTop(target);
        let focused = SetForegroundWindow(target).as_bool();
        let _ = SetWindowPos(target, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE);
        let _ = SetWindowPos(target, HWND_NOTOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE);

        if attached {
            let _ = AttachThreadInput(current_thread, foreground_thread, false);
        }
        focused
    }
}
