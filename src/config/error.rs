#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config file not found in {dir}; expected {machine_file} or {generic_file}")]
    NotFound {
        dir: String,
        machine_file: String,
        generic_file: String,
    },
    #[error("missing required config key `{0}`")]
    MissingKey(&'static str),
    #[error("config validation failed: {0}")]
    Invalid(String),
    #[error("failed to resolve the executable directory for config lookup")]
    ExecutableDirUnavailable,
}
