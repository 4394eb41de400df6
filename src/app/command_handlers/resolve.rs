use crate::app::cli::GlobalOptions;
use crate::app::command_support::{config_dir, load_helper_lenient};
use crate::config::machine_hostname;
use crate::resolver::PathResolver;
use crate::shared::RuntimeLog;

pub fn cmd_resolve(options: &GlobalOptions, args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err("usage: deskagent resolve <path>...".to_string());
    }
    let dir = config_dir(options)?;
    let log = RuntimeLog::disabled();
    let config = load_helper_lenient(&dir, &machine_hostname(), &log);
    let resolver = PathResolver::new(config.cloud_root_folder, log);

    let mut lines = args
        .iter()
        .map(|path| format!("{path} -> {}", resolver.resolve(path)))
        .collect::<Vec<_>>();
    lines.push(format!(
        "cloud_root={}",
        resolver.cached_root().unwrap_or("(not discovered)")
    ));
    Ok(lines.join("\n"))
}
