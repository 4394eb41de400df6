use super::actions::file_name;
use super::process::{parent_dir, run_process, ProcessSpec};
use super::{ExecError, ExecutionResult};
use crate::config::AgentConfig;
use crate::portal::Task;
use crate::resolver::PathResolver;
use crate::runlog::RunLog;
use crate::shared::RuntimeLog;
use std::path::{Path, PathBuf};

const VENV_DIR: &str = ".venv";
const VENV_MARKERS: [&str; 3] = ["Scripts\\python.exe ", "Scripts/python.exe ", "bin/python "];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPlan {
    pub spec: ProcessSpec,
    pub display_name: String,
}

/// Interpreter inside a project's `.venv`.
pub fn venv_interpreter(project: &Path) -> PathBuf {
    if cfg!(windows) {
        project.join(VENV_DIR).join("Scripts").join("python.exe")
    } else {
        project.join(VENV_DIR).join("bin").join("python")
    }
}

/// Splits `<project>/.venv/Scripts/python.exe <script>` into interpreter,
/// project directory and script. `None` when `target` is not of that form.
pub fn split_venv_invocation(target: &str) -> Option<(String, PathBuf, String)> {
    let target = format!("{} ", target.trim_end());
    let venv_at = target.find(VENV_DIR)?;
    let (marker_at, marker) = VENV_MARKERS
        .iter()
        .filter_map(|marker| target.find(marker).map(|at| (at, *marker)))
        .min_by_key(|(at, _)| *at)?;
    if marker_at < venv_at {
        return None;
    }

    let interpreter = target[..marker_at + marker.len() - 1].to_string();
    let project = target[..venv_at].trim_end_matches(['\\', '/']);
    let script = target[marker_at + marker.len()..].trim().to_string();
    Some((interpreter, PathBuf::from(project), script))
}

pub fn plan_script(
    task: &Task,
    config: &AgentConfig,
    resolver: &PathResolver,
    log: &RuntimeLog,
) -> Result<ScriptPlan, ExecError> {
    let extra_args = task.run_config_args();

    let Some(raw_target) = task.target() else {
        return plan_configured_script(task, config, extra_args);
    };
    let target = resolver.expand(raw_target);

    if let Some((project, module)) = target.split_once('|') {
        let project = PathBuf::from(project.trim());
        let module = module.trim().to_string();
        if !project.exists() {
            return Err(ExecError::not_found("Project path", project.display()));
        }
        let venv = venv_interpreter(&project);
        let interpreter = if venv.exists() {
            log.info(
                "script.interpreter",
                &format!("using project interpreter {}", venv.display()),
            );
            venv.to_string_lossy().into_owned()
        } else {
            log.info(
                "script.interpreter",
                &format!(
                    "no project interpreter, using {}",
                    config.interpreter_path
                ),
            );
            config.interpreter_path.clone()
        };
        let mut args = vec!["-m".to_string(), module.clone()];
        args.extend(extra_args);
        return Ok(ScriptPlan {
            spec: ProcessSpec::new(interpreter, args, project),
            display_name: module,
        });
    }

    if let Some((interpreter, project, script)) = split_venv_invocation(&target) {
        if script.is_empty() {
            return Err(ExecError::not_configured(
                "Script path not specified after venv python.exe",
            ));
        }
        let interpreter = if Path::new(&interpreter).exists() {
            interpreter
        } else {
            log.warn(
                "script.venv_missing",
                &format!(
                    "WARNING: {interpreter} not found, falling back to {}",
                    config.interpreter_path
                ),
            );
            config.interpreter_path.clone()
        };
        let mut args = vec![script.clone()];
        args.extend(extra_args);
        return Ok(ScriptPlan {
            spec: ProcessSpec::new(interpreter, args, project),
            display_name: script,
        });
    }

    let script = PathBuf::from(target.trim());
    plan_script_file(script, config, extra_args)
}

fn plan_configured_script(
    task: &Task,
    config: &AgentConfig,
    extra_args: Vec<String>,
) -> Result<ScriptPlan, ExecError> {
    let Some(script) = task.run_config_str("script") else {
        return Err(ExecError::not_configured(
            "Script path not configured (target or run_config.script)",
        ));
    };
    let mut path = PathBuf::from(script);
    if path.is_relative() {
        if let Some(base) = &config.scripts_base_path {
            path = base.join(path);
        }
    }
    plan_script_file(path, config, extra_args)
}

fn plan_script_file(
    script: PathBuf,
    config: &AgentConfig,
    extra_args: Vec<String>,
) -> Result<ScriptPlan, ExecError> {
    if !script.exists() {
        return Err(ExecError::not_found("Script", script.display()));
    }
    let mut args = vec![script.to_string_lossy().into_owned()];
    args.extend(extra_args);
    Ok(ScriptPlan {
        display_name: file_name(&script),
        spec: ProcessSpec::new(config.interpreter_path.clone(), args, parent_dir(&script)),
    })
}

pub fn run_script(
    task: &Task,
    config: &AgentConfig,
    resolver: &PathResolver,
    log: &RuntimeLog,
    mut sink: Option<&mut RunLog>,
) -> Result<ExecutionResult, ExecError> {
    let plan = plan_script(task, config, resolver, log)?;
    log.info(
        "script.start",
        &format!(
            "{} (cwd: {})",
            plan.spec.command_line(),
            plan.spec.cwd.display()
        ),
    );
    if let Some(sink) = sink.as_deref_mut() {
        let _ = sink.write_command(&plan.spec.command_line(), &plan.spec.cwd);
    }

    let exit = run_process(&plan.spec, sink, config.execution_timeout())?;
    if exit.success() {
        Ok(ExecutionResult::success(format!(
            "Python completed: {}",
            plan.display_name
        )))
    } else {
        Err(ExecError::NonZeroExit(exit.code))
    }
}
