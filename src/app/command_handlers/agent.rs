use crate::app::cli::GlobalOptions;
use crate::app::command_support::{agent_log, config_dir, load_agent};
use crate::config::machine_hostname;
use crate::executor::{LocalActions, TaskExecutor};
use crate::portal::HttpPortal;
use crate::resolver::PathResolver;
use crate::runtime::{AgentLoop, IterationOutcome, LoopSettings, SystemClock};
use crate::shell::NativeShell;

/// Wires the production collaborators together and hands the loop to `body`.
fn with_agent<R>(
    options: &GlobalOptions,
    echo: bool,
    body: impl FnOnce(&mut AgentLoop<'_>) -> R,
) -> Result<R, String> {
    let dir = config_dir(options)?;
    let hostname = machine_hostname();
    let loaded = load_agent(&dir, &hostname)?;
    let config = loaded.config;

    let log = agent_log(&config).with_echo(echo);
    log.info(
        "agent.config",
        &format!("config loaded from {}", loaded.path.display()),
    );

    let resolver = PathResolver::new(config.cloud_root_folder.clone(), log.clone());
    let shell = NativeShell::new();
    let actions = LocalActions::new(&resolver, &shell, &shell, &config.tabs, &log);
    let executor = TaskExecutor::new(&config, actions, &log);
    let portal = HttpPortal::from_config(&config);
    let clock = SystemClock::new();
    let settings = LoopSettings::from_config(&config, hostname);

    let mut agent = AgentLoop::new(&portal, &executor, &clock, &log, settings);
    Ok(body(&mut agent))
}

pub fn cmd_run(options: &GlobalOptions) -> Result<String, String> {
    with_agent(options, true, |agent| -> String {
        agent.start();
        agent.run_forever()
    })
}

pub fn cmd_once(options: &GlobalOptions) -> Result<String, String> {
    with_agent(options, false, |agent| {
        agent.start();
        describe_outcome(&agent.poll_once())
    })
}

pub fn describe_outcome(outcome: &IterationOutcome) -> String {
    match outcome {
        IterationOutcome::Idle => "no task available".to_string(),
        IterationOutcome::Completed {
            run_id,
            status,
            reported,
        } => format!(
            "run_id={run_id} status={} reported={reported}",
            status.as_str()
        ),
    }
}
