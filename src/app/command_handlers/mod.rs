use crate::app::cli::{help_text, parse_cli_verb, split_global_options, CliVerb};

pub mod agent;
pub mod config;
pub mod helper;
pub mod resolve;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let (options, args) = split_global_options(args)?;
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Run => agent::cmd_run(&options),
        CliVerb::Once => agent::cmd_once(&options),
        CliVerb::Handle => helper::cmd_handle(&options, &args[1..]),
        CliVerb::Resolve => resolve::cmd_resolve(&options, &args[1..]),
        CliVerb::Config => config::cmd_config(&options),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
