use crate::shell::ShellError;
use thiserror::Error;

/// Every way a task can fail. The `Display` text is what gets reported to
/// the portal as `error_message`.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}")]
    NotConfigured(String),
    #[error("{kind} not found: {path}")]
    NotFound { kind: &'static str, path: String },
    #[error("Exit code: {0}")]
    NonZeroExit(i32),
    #[error("Execution timed out")]
    Timeout,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error("Unsupported tool type: {0}")]
    UnsupportedTool(String),
    #[error("no Excel files in {0}")]
    NoExcelFiles(String),
}

impl ExecError {
    pub(crate) fn not_configured(message: &str) -> Self {
        Self::NotConfigured(message.to_string())
    }

    pub(crate) fn not_found(kind: &'static str, path: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            path: path.to_string(),
        }
    }
}
