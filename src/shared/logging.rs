use super::time::{local_timestamp, now_secs};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

pub fn append_json_log_line(path: &Path, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": now_secs(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

/// Event log shared by the agent loop, executors and the helper.
///
/// Lines go to an append-only JSON-lines file when a path is set, and are
/// echoed to stderr in `[timestamp] message` form when `echo` is on. Write
/// failures are dropped: logging never interrupts task execution.
#[derive(Debug, Clone, Default)]
pub struct RuntimeLog {
    path: Option<PathBuf>,
    echo: bool,
}

impl RuntimeLog {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            echo: false,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.write(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.write(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.write(LogLevel::Error, event, message);
    }

    pub fn write(&self, level: LogLevel, event: &str, message: &str) {
        if self.echo {
            eprintln!("[{}] {message}", local_timestamp());
        }
        if let Some(path) = &self.path {
            append_json_log_line(path, level.as_str(), event, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn runtime_log_writes_json_lines_with_level_and_event() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("logs/agent.log");
        let log = RuntimeLog::to_file(&path);

        log.info("task.claimed", "run-1");
        log.warn("heartbeat.failed", "connection refused");

        let raw = fs::read_to_string(&path).expect("read log");
        let lines = raw.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"level\":\"info\""));
        assert!(lines[0].contains("\"event\":\"task.claimed\""));
        assert!(lines[1].contains("\"level\":\"warn\""));
        assert!(lines[1].contains("\"message\":\"connection refused\""));
    }

    #[test]
    fn disabled_log_has_no_path() {
        let log = RuntimeLog::disabled();
        assert!(log.path().is_none());
        log.error("noop", "nothing is written");
    }
}
