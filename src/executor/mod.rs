//! Per-tool-type task execution.

pub mod actions;
pub mod batch_script;
pub mod error;
pub mod file_open;
pub mod flow_automation;
pub mod native_exe;
pub mod process;
pub mod script_runner;

pub use actions::{LocalActions, OpenedPath};
pub use error::ExecError;
pub use process::{run_process, ProcessExit, ProcessSpec};

use crate::config::AgentConfig;
use crate::portal::{Task, ToolType};
use crate::runlog::RunLog;
use crate::shared::RuntimeLog;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecStatus {
    Success,
    Failed,
    Running,
}

impl ExecStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Running => "running",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecStatus,
    pub summary: Option<String>,
    pub error_message: Option<String>,
}

impl ExecutionResult {
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Success,
            summary: Some(summary.into()),
            error_message: None,
        }
    }

    pub fn running(summary: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Running,
            summary: Some(summary.into()),
            error_message: None,
        }
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: ExecStatus::Failed,
            summary: None,
            error_message: Some(error_message.into()),
        }
    }
}

impl From<ExecError> for ExecutionResult {
    fn from(err: ExecError) -> Self {
        Self::failed(err.to_string())
    }
}

/// What the protocol loop calls to run a claimed task.
pub trait TaskDispatch {
    fn execute(&self, task: &Task, sink: Option<&mut RunLog>) -> ExecutionResult;
}

pub struct TaskExecutor<'a> {
    config: &'a AgentConfig,
    actions: LocalActions<'a>,
    log: &'a RuntimeLog,
}

impl<'a> TaskExecutor<'a> {
    pub fn new(config: &'a AgentConfig, actions: LocalActions<'a>, log: &'a RuntimeLog) -> Self {
        Self {
            config,
            actions,
            log,
        }
    }

    fn run(&self, task: &Task, sink: Option<&mut RunLog>) -> Result<ExecutionResult, ExecError> {
        match &task.tool_type {
            ToolType::ScriptRunner => script_runner::run_script(
                task,
                self.config,
                self.actions.resolver(),
                self.log,
                sink,
            ),
            ToolType::FlowAutomation => {
                flow_automation::run_flow(task, self.config, self.actions.launcher(), self.log)
            }
            ToolType::NativeExe => native_exe::run_native_exe(task, &self.actions),
            ToolType::BatchScript => batch_script::run_batch(
                task,
                self.config,
                self.actions.resolver(),
                self.log,
                sink,
            ),
            ToolType::FileOpen => file_open::run_file_open(task, &self.actions),
            ToolType::Unsupported(name) => Err(ExecError::UnsupportedTool(name.clone())),
        }
    }
}

impl TaskDispatch for TaskExecutor<'_> {
    fn execute(&self, task: &Task, sink: Option<&mut RunLog>) -> ExecutionResult {
        self.log.info(
            "task.execute",
            &format!(
                "{} (type: {}, run_id: {})",
                task.tool_name, task.tool_type, task.run_id
            ),
        );
        match self.run(task, sink) {
            Ok(result) => result,
            Err(err) => {
                self.log
                    .error("task.failed", &format!("{}: {err}", task.run_id));
                err.into()
            }
        }
    }
}
