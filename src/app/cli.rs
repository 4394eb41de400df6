use std::path::PathBuf;

pub const CONFIG_DIR_FLAG: &str = "--config-dir";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Once,
    Handle,
    Resolve,
    Config,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "once" => CliVerb::Once,
        "handle" => CliVerb::Handle,
        "resolve" => CliVerb::Resolve,
        "config" => CliVerb::Config,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Usage: deskagent [--config-dir <dir>] <command>".to_string(),
        String::new(),
        "Commands:".to_string(),
        "  run                                  Heartbeat, claim and execute tasks until stopped"
            .to_string(),
        "  once                                 Run a single heartbeat/claim/execute pass"
            .to_string(),
        "  handle <uri>                         Handle a helper link as the URI handler would"
            .to_string(),
        "  resolve <path>...                    Print how paths resolve on this machine"
            .to_string(),
        "  config                               Show the effective configuration".to_string(),
        "  help                                 Show this help".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = cli_help_lines();
    lines.push(String::new());
    lines.push(format!(
        "The config directory defaults to ${}, then the executable's directory.",
        crate::config::CONFIG_DIR_ENV
    ));
    lines.join("\n")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub config_dir: Option<PathBuf>,
}

/// Pulls `--config-dir <dir>` (or `--config-dir=<dir>`) out of `args`,
/// wherever it appears, and returns the remaining arguments in order.
pub fn split_global_options(args: Vec<String>) -> Result<(GlobalOptions, Vec<String>), String> {
    let mut options = GlobalOptions::default();
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == CONFIG_DIR_FLAG {
            let value = iter
                .next()
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| format!("{CONFIG_DIR_FLAG} requires a directory"))?;
            options.config_dir = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--config-dir=") {
            if value.trim().is_empty() {
                return Err(format!("{CONFIG_DIR_FLAG} requires a directory"));
            }
            options.config_dir = Some(PathBuf::from(value));
        } else {
            rest.push(arg);
        }
    }
    Ok((options, rest))
}
