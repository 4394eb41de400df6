//! Per-run transcript files (`run-<run_id>.log`).

use crate::shared::local_timestamp;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write run log {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    pub fn file_path(dir: &Path, run_id: &str) -> PathBuf {
        let safe_id = run_id
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                    ch
                } else {
                    '_'
                }
            })
            .collect::<String>();
        dir.join(format!("run-{safe_id}.log"))
    }

    /// Creates (or truncates) the transcript and writes its header.
    pub fn create(dir: &Path, run_id: &str, tool_name: &str) -> Result<Self, RunLogError> {
        fs::create_dir_all(dir).map_err(|source| RunLogError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;
        let path = Self::file_path(dir, run_id);
        let file = File::create(&path).map_err(|source| RunLogError::Write {
            path: path.display().to_string(),
            source,
        })?;
        let mut log = Self { path, file };
        log.write_raw(&format!(
            "=== Runner Log ===\nRun ID: {run_id}\nTool: {tool_name}\nStart: {}\n==================\n\n",
            local_timestamp()
        ))?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, line: &str) -> Result<(), RunLogError> {
        self.write_raw(&format!("{}\n", line.trim_end_matches(['\r', '\n'])))
    }

    pub fn write_command(&mut self, command: &str, cwd: &Path) -> Result<(), RunLogError> {
        self.write_raw(&format!(
            "[Command] {command}\n[Working Directory] {}\n\n[Output]\n",
            cwd.display()
        ))
    }

    pub fn finalize(&mut self, status: &str) -> Result<(), RunLogError> {
        self.write_raw(&format!(
            "\n=== End ===\nFinished: {}\nStatus: {status}\n",
            local_timestamp()
        ))
    }

    fn write_raw(&mut self, text: &str) -> Result<(), RunLogError> {
        self.file
            .write_all(text.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|source| RunLogError::Write {
                path: self.path.display().to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn transcript_has_header_command_output_and_footer() {
        let dir = tempdir().expect("tempdir");
        let mut log = RunLog::create(dir.path(), "r-17", "nightly-report").expect("create");
        log.write_command("python report.py", Path::new("/srv/scripts"))
            .expect("command");
        log.append("processing 3 rows\n").expect("append");
        log.finalize("success").expect("finalize");

        let raw = fs::read_to_string(dir.path().join("run-r-17.log")).expect("read");
        assert!(raw.starts_with("=== Runner Log ===\nRun ID: r-17\nTool: nightly-report\nStart: "));
        assert!(raw.contains("[Command] python report.py\n[Working Directory] /srv/scripts\n\n[Output]\nprocessing 3 rows\n"));
        assert!(raw.contains("\n=== End ===\nFinished: "));
        assert!(raw.ends_with("Status: success\n"));
    }

    #[test]
    fn recreating_a_run_truncates_previous_transcript() {
        let dir = tempdir().expect("tempdir");
        let mut first = RunLog::create(dir.path(), "r-1", "tool").expect("create");
        first.append("old output").expect("append");
        drop(first);

        let _second = RunLog::create(dir.path(), "r-1", "tool").expect("recreate");
        let raw = fs::read_to_string(dir.path().join("run-r-1.log")).expect("read");
        assert!(!raw.contains("old output"));
    }

    #[test]
    fn run_id_is_sanitized_for_file_name() {
        let path = RunLog::file_path(Path::new("/logs"), "../x/y");
        assert_eq!(path, Path::new("/logs/run-.._x_y.log"));
    }
}
