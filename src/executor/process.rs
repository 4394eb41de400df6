use super::ExecError;
use crate::runlog::RunLog;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(windows)]
const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

const WAIT_STEP: Duration = Duration::from_millis(10);
const DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.cwd);
        command
    }

    fn spawn(&self, command: &mut Command) -> Result<Child, ExecError> {
        command.spawn().map_err(|source| ExecError::Spawn {
            program: self.program.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: i32,
}

impl ProcessExit {
    pub fn success(self) -> bool {
        self.code == 0
    }

    fn from_status(status: ExitStatus) -> Self {
        Self {
            code: status.code().unwrap_or(-1),
        }
    }
}

/// Runs `spec` and waits for it for at most `timeout`.
///
/// With a sink, stdout and stderr are captured line by line into it. Without
/// one the process gets a visible console of its own. On expiry the child is
/// killed and `ExecError::Timeout` returned.
pub fn run_process(
    spec: &ProcessSpec,
    sink: Option<&mut RunLog>,
    timeout: Duration,
) -> Result<ProcessExit, ExecError> {
    match sink {
        Some(sink) => run_captured(spec, sink, timeout),
        None => run_in_console(spec, timeout),
    }
}

fn run_captured(
    spec: &ProcessSpec,
    sink: &mut RunLog,
    timeout: Duration,
) -> Result<ProcessExit, ExecError> {
    let mut command = spec.command();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = spec.spawn(&mut command)?;

    let (tx, rx) = mpsc::channel::<String>();
    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, tx.clone());
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    loop {
        let drained = match rx.recv_timeout(WAIT_STEP) {
            Ok(line) => {
                let _ = sink.append(&line);
                false
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => true,
        };

        if let Some(status) = child.try_wait().map_err(|source| ExecError::Io {
            context: format!("waiting for {}", spec.program),
            source,
        })? {
            drain_remaining(&rx, sink);
            return Ok(ProcessExit::from_status(status));
        }

        if Instant::now() >= deadline {
            kill(&mut child);
            let _ = sink.append(&format!("[Timeout] killed after {}s", timeout.as_secs()));
            return Err(ExecError::Timeout);
        }

        if drained {
            thread::sleep(WAIT_STEP);
        }
    }
}

fn run_in_console(spec: &ProcessSpec, timeout: Duration) -> Result<ProcessExit, ExecError> {
    let mut command = spec.command();
    new_console(&mut command);
    let mut child = spec.spawn(&mut command)?;

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(|source| ExecError::Io {
            context: format!("waiting for {}", spec.program),
            source,
        })? {
            return Ok(ProcessExit::from_status(status));
        }
        if Instant::now() >= deadline {
            kill(&mut child);
            return Err(ExecError::Timeout);
        }
        thread::sleep(WAIT_STEP);
    }
}

/// Starts `spec` without waiting for it. Returns the child's pid.
pub fn spawn_detached(spec: &ProcessSpec) -> Result<u32, ExecError> {
    let mut command = spec.command();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    spec.spawn(&mut command).map(reap_in_background)
}

/// Starts `spec` in a console window of its own without waiting for it.
pub fn spawn_console(spec: &ProcessSpec) -> Result<u32, ExecError> {
    let mut command = spec.command();
    new_console(&mut command);
    spec.spawn(&mut command).map(reap_in_background)
}

/// Hands `command_line` to the system shell and returns immediately.
pub fn spawn_shell_command(command_line: &str) -> Result<u32, ExecError> {
    let mut command = shell_command(command_line);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
        .spawn()
        .map(reap_in_background)
        .map_err(|source| ExecError::Spawn {
            program: command_line.to_string(),
            source,
        })
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    use std::os::windows::process::CommandExt;
    let mut command = Command::new("cmd");
    command.arg("/C").raw_arg(command_line);
    command
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn new_console(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    command.creation_flags(CREATE_NEW_CONSOLE);
}

#[cfg(not(windows))]
fn new_console(_command: &mut Command) {}

/// Working directory for a file: its parent, or `.` for a bare file name.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Hands a fire-and-forget child to a waiter thread so it is reaped on exit.
fn reap_in_background(mut child: Child) -> u32 {
    let pid = child.id();
    thread::spawn(move || {
        let _ = child.wait();
    });
    pid
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn forward_lines<R>(source: R, tx: Sender<String>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Collects output still in flight after exit, for at most `DRAIN_GRACE` in
/// total. Lines a grandchild writes after that are dropped.
fn drain_remaining(rx: &Receiver<String>, sink: &mut RunLog) {
    let deadline = Instant::now() + DRAIN_GRACE;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        match rx.recv_timeout(remaining) {
            Ok(line) => {
                let _ = sink.append(&line);
            }
            Err(_) => return,
        }
    }
}
