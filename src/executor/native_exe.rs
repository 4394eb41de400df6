use super::actions::LocalActions;
use super::{ExecError, ExecutionResult};
use crate::portal::Task;

/// Launches the target executable. Success means it started; what it does
/// afterwards is not tracked.
pub fn run_native_exe(task: &Task, actions: &LocalActions<'_>) -> Result<ExecutionResult, ExecError> {
    let target = task
        .target()
        .ok_or_else(|| ExecError::not_configured("EXE target not configured"))?;
    actions.run_executable(target)?;
    Ok(ExecutionResult::success("EXE launched"))
}
