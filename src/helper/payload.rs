use super::HelperError;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const KNOWN_ACTIONS: [&str; 7] = [
    "open_file",
    "open_folder",
    "open_folders",
    "run_exe",
    "run_bat",
    "open_shortcut",
    "open_url",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcelOpenMode {
    File,
    FolderLatestCreated,
    FolderPick,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HelperPayload {
    OpenFile {
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        excel_open_mode: Option<ExcelOpenMode>,
        #[serde(default)]
        excel_folder_path: Option<String>,
    },
    OpenFolder {
        #[serde(default)]
        path: Option<String>,
    },
    OpenFolders {
        #[serde(default)]
        paths: Vec<String>,
    },
    RunExe {
        #[serde(default)]
        path: Option<String>,
    },
    RunBat {
        #[serde(default)]
        path: Option<String>,
    },
    OpenShortcut {
        #[serde(default)]
        path: Option<String>,
    },
    OpenUrl {
        #[serde(default)]
        url: Option<String>,
    },
}

impl HelperPayload {
    pub fn from_value(mut map: Map<String, Value>) -> Result<Self, HelperError> {
        let action = match map.get("action").and_then(Value::as_str).map(str::trim) {
            Some(action) if !action.is_empty() => action.to_string(),
            _ => return Err(HelperError::MissingAction),
        };
        if !KNOWN_ACTIONS.contains(&action.as_str()) {
            return Err(HelperError::UnknownAction(action));
        }
        map.insert("action".to_string(), Value::String(action.clone()));
        serde_json::from_value(Value::Object(map))
            .map_err(|err| HelperError::InvalidPayload(format!("{action}: {err}")))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::OpenFile { .. } => "open_file",
            Self::OpenFolder { .. } => "open_folder",
            Self::OpenFolders { .. } => "open_folders",
            Self::RunExe { .. } => "run_exe",
            Self::RunBat { .. } => "run_bat",
            Self::OpenShortcut { .. } => "open_shortcut",
            Self::OpenUrl { .. } => "open_url",
        }
    }
}
