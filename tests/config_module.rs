use deskagent::config::{
    load_agent_config, load_helper_config, ConfigError, FolderSetMode, DEFAULT_URI_SCHEME,
};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn full_agent_config_round_trips_every_section() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("config.yaml"),
        r#"
portal_url: https://portal.example.com/
machine_key: k-123
poll_interval_sec: 5
heartbeat_interval_sec: 60
execution_timeout_sec: 900
log_dir: C:\deskagent\logs
interpreter_path: C:\Python312\python.exe
scripts_base_path: C:\deskagent\scripts
cloud_root_folder: OneDrive - Example Corp
tabs:
  folder_set_mode: windows
  first_window_wait_ms: 1500
  home_labels: [Home, Start]
"#,
    )
    .expect("write config");

    let loaded = load_agent_config(dir.path(), "ws-01").expect("load");
    let config = loaded.config;

    assert_eq!(loaded.path, dir.path().join("config.yaml"));
    assert_eq!(config.poll_interval(), Duration::from_secs(5));
    assert_eq!(config.heartbeat_interval(), Duration::from_secs(60));
    assert_eq!(config.execution_timeout(), Duration::from_secs(900));
    assert_eq!(
        config.cloud_root_folder.as_deref(),
        Some("OneDrive - Example Corp")
    );
    assert_eq!(config.tabs.folder_set_mode, FolderSetMode::Windows);
    assert_eq!(config.tabs.first_window_wait_ms, 1500);
    assert_eq!(config.tabs.home_labels, vec!["Home", "Start"]);
    assert_eq!(
        config.endpoint("api/runner/claim"),
        "https://portal.example.com/api/runner/claim"
    );
}

#[test]
fn invalid_yaml_is_a_parse_error_naming_the_file() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("config.yaml"), "portal_url: [unterminated").expect("write");

    match load_agent_config(dir.path(), "ws-01") {
        Err(ConfigError::Parse { path, .. }) => assert!(path.ends_with("config.yaml")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn helper_reads_scheme_and_root_without_portal_keys() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("config-WS-02.yaml"),
        "uri_scheme: acme-desk\ncloud_root_folder: OneDrive - Acme\n",
    )
    .expect("write");

    let machine = load_helper_config(dir.path(), "ws-02").expect("machine file");
    assert_eq!(machine.uri_scheme, "acme-desk");
    assert_eq!(machine.cloud_root_folder.as_deref(), Some("OneDrive - Acme"));

    let other = load_helper_config(dir.path(), "ws-03").expect("defaults");
    assert_eq!(other.uri_scheme, DEFAULT_URI_SCHEME);
    assert!(other.cloud_root_folder.is_none());
}
