use deskagent::config::{AgentConfig, TabSettings};
use deskagent::executor::{ExecStatus, LocalActions, TaskDispatch, TaskExecutor};
use deskagent::portal::{Task, ToolType};
use deskagent::resolver::PathResolver;
use deskagent::runlog::RunLog;
use deskagent::shared::RuntimeLog;
use deskagent::shell::NativeShell;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn execute(config: &AgentConfig, task: &Task, sink: Option<&mut RunLog>) -> (ExecStatus, String) {
    let log = RuntimeLog::disabled();
    let resolver = PathResolver::new(None, RuntimeLog::disabled());
    let shell = NativeShell::new();
    let tabs = TabSettings::immediate();
    let actions = LocalActions::new(&resolver, &shell, &shell, &tabs, &log);
    let result = TaskExecutor::new(config, actions, &log).execute(task, sink);
    let message = result
        .summary
        .or(result.error_message)
        .unwrap_or_default();
    (result.status, message)
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

#[test]
fn unknown_tool_types_fail_with_their_name() {
    let config = AgentConfig::new("https://portal.example.com", "key");
    let task = Task::new("run-1", ToolType::parse("quantum_job"), "Q");
    let (status, message) = execute(&config, &task, None);
    assert_eq!(status, ExecStatus::Failed);
    assert_eq!(message, "Unsupported tool type: quantum_job");
}

#[test]
fn missing_executable_is_reported_as_not_found() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("nowhere.exe");
    let config = AgentConfig::new("https://portal.example.com", "key");
    let task = Task::new("run-2", ToolType::NativeExe, "Exe")
        .with_target(missing.display().to_string());
    let (status, message) = execute(&config, &task, None);
    assert_eq!(status, ExecStatus::Failed);
    assert_eq!(message, format!("EXE not found: {}", missing.display()));
}

#[test]
fn script_runner_without_any_script_is_not_configured() {
    let config = AgentConfig::new("https://portal.example.com", "key");
    let task = Task::new("run-3", ToolType::ScriptRunner, "Py");
    let (status, message) = execute(&config, &task, None);
    assert_eq!(status, ExecStatus::Failed);
    assert!(message.contains("Script path not configured"), "{message}");
}

#[cfg(unix)]
#[test]
fn missing_venv_interpreter_falls_back_to_configured_interpreter() {
    let dir = tempdir().expect("tempdir");
    let interpreter = dir.path().join("fake-python");
    write_script(&interpreter, "#!/bin/sh\necho \"ran $1 in $(basename \"$(pwd -P)\")\"\n");
    let project = dir.path().join("sales");
    fs::create_dir_all(&project).expect("project dir");

    let mut config = AgentConfig::new("https://portal.example.com", "key");
    config.interpreter_path = interpreter.display().to_string();
    let task = Task::new("run-4", ToolType::ScriptRunner, "Sales").with_target(format!(
        "{}/.venv/bin/python main.py",
        project.display()
    ));
    let logs = dir.path().join("logs");
    let mut run_log = RunLog::create(&logs, "run-4", "Sales").expect("run log");

    let (status, message) = execute(&config, &task, Some(&mut run_log));

    assert_eq!(status, ExecStatus::Success, "{message}");
    assert_eq!(message, "Python completed: main.py");
    let transcript = fs::read_to_string(run_log.path()).expect("transcript");
    assert!(transcript.contains("ran main.py in sales"), "{transcript}");
    assert!(transcript.contains("[Command]"));
}

#[cfg(unix)]
#[test]
fn module_form_passes_run_config_args_after_the_module() {
    let dir = tempdir().expect("tempdir");
    let interpreter = dir.path().join("fake-python");
    write_script(&interpreter, "#!/bin/sh\necho \"args: $*\"\n");
    let project = dir.path().join("etl");
    fs::create_dir_all(&project).expect("project dir");

    let mut config = AgentConfig::new("https://portal.example.com", "key");
    config.interpreter_path = interpreter.display().to_string();
    let task = Task::new("run-5", ToolType::ScriptRunner, "ETL")
        .with_target(format!("{}|etl.main", project.display()))
        .with_run_config(json!({"args": ["--day", "2024-01-31"]}));
    let mut run_log = RunLog::create(dir.path(), "run-5", "ETL").expect("run log");

    let (status, message) = execute(&config, &task, Some(&mut run_log));

    assert_eq!(status, ExecStatus::Success, "{message}");
    let transcript = fs::read_to_string(run_log.path()).expect("transcript");
    assert!(
        transcript.contains("args: -m etl.main --day 2024-01-31"),
        "{transcript}"
    );
}

#[cfg(unix)]
#[test]
fn nonzero_exit_is_a_failure_with_the_code() {
    let dir = tempdir().expect("tempdir");
    let interpreter = dir.path().join("fake-python");
    write_script(&interpreter, "#!/bin/sh\nexit 3\n");
    let script = dir.path().join("job.py");
    fs::write(&script, "print('x')\n").expect("script");

    let mut config = AgentConfig::new("https://portal.example.com", "key");
    config.interpreter_path = interpreter.display().to_string();
    let task = Task::new("run-6", ToolType::ScriptRunner, "Job")
        .with_target(script.display().to_string());
    let mut run_log = RunLog::create(dir.path(), "run-6", "Job").expect("run log");

    let (status, message) = execute(&config, &task, Some(&mut run_log));
    assert_eq!(status, ExecStatus::Failed);
    assert_eq!(message, "Exit code: 3");
}

#[cfg(unix)]
#[test]
fn long_running_script_is_killed_at_the_execution_timeout() {
    let dir = tempdir().expect("tempdir");
    let interpreter = dir.path().join("fake-python");
    write_script(&interpreter, "#!/bin/sh\nexec sleep 30\n");
    let script = dir.path().join("slow.py");
    fs::write(&script, "").expect("script");

    let mut config = AgentConfig::new("https://portal.example.com", "key");
    config.interpreter_path = interpreter.display().to_string();
    config.execution_timeout_sec = 1;
    let task = Task::new("run-7", ToolType::ScriptRunner, "Slow")
        .with_target(script.display().to_string());
    let mut run_log = RunLog::create(dir.path(), "run-7", "Slow").expect("run log");

    let started = std::time::Instant::now();
    let (status, message) = execute(&config, &task, Some(&mut run_log));

    assert_eq!(status, ExecStatus::Failed);
    assert_eq!(message, "Execution timed out");
    assert!(started.elapsed() < std::time::Duration::from_secs(15));
}

#[cfg(unix)]
#[test]
fn batch_script_output_lands_in_the_transcript() {
    let dir = tempdir().expect("tempdir");
    let script = dir.path().join("nightly.sh");
    write_script(&script, "echo nightly done\n");

    let config = AgentConfig::new("https://portal.example.com", "key");
    let task = Task::new("run-8", ToolType::BatchScript, "Nightly")
        .with_target(script.display().to_string());
    let mut run_log = RunLog::create(dir.path(), "run-8", "Nightly").expect("run log");

    let (status, message) = execute(&config, &task, Some(&mut run_log));

    assert_eq!(status, ExecStatus::Success, "{message}");
    assert_eq!(message, "BAT completed: nightly.sh");
    let transcript = fs::read_to_string(run_log.path()).expect("transcript");
    assert!(transcript.contains("nightly done"));
}
