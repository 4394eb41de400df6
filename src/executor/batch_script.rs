use super::actions::{batch_spec, file_name};
use super::process::run_process;
use super::{ExecError, ExecutionResult};
use crate::config::AgentConfig;
use crate::portal::Task;
use crate::resolver::PathResolver;
use crate::runlog::RunLog;
use crate::shared::RuntimeLog;
use std::path::PathBuf;

pub fn run_batch(
    task: &Task,
    config: &AgentConfig,
    resolver: &PathResolver,
    log: &RuntimeLog,
    mut sink: Option<&mut RunLog>,
) -> Result<ExecutionResult, ExecError> {
    let target = task
        .target()
        .ok_or_else(|| ExecError::not_configured("BAT target not configured"))?;
    let path = PathBuf::from(resolver.expand(target));
    if !path.exists() {
        return Err(ExecError::not_found("BAT", path.display()));
    }

    let spec = batch_spec(&path);
    log.info("batch.start", &spec.command_line());
    if let Some(sink) = sink.as_deref_mut() {
        let _ = sink.write_command(&spec.command_line(), &spec.cwd);
    }

    let exit = run_process(&spec, sink, config.execution_timeout())?;
    if exit.success() {
        Ok(ExecutionResult::success(format!(
            "BAT completed: {}",
            file_name(&path)
        )))
    } else {
        Err(ExecError::NonZeroExit(exit.code))
    }
}
