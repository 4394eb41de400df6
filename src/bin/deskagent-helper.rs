//! Target of the `deskagent://` URI scheme registration: `deskagent-helper <uri>`.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use deskagent::app::command_handlers::helper::run_helper;
use deskagent::config::default_config_dir;
use std::path::PathBuf;

fn run() -> Result<(), String> {
    let uri = std::env::args().nth(1);
    let dir = default_config_dir().unwrap_or_else(|_| PathBuf::from("."));
    let output = run_helper(&dir, uri.as_deref())?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
