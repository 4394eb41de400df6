use super::PortalError;
use crate::executor::ExecStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolType {
    ScriptRunner,
    FlowAutomation,
    NativeExe,
    BatchScript,
    FileOpen,
    Unsupported(String),
}

impl ToolType {
    /// Accepts both the canonical names and the portal's legacy ones.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "script_runner" | "python_runner" => Self::ScriptRunner,
            "flow_automation" | "pad" => Self::FlowAutomation,
            "native_exe" | "exe" => Self::NativeExe,
            "batch_script" | "bat" => Self::BatchScript,
            "file_open" | "excel" | "sheet" | "folder" | "bi" | "folder_set" => Self::FileOpen,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ScriptRunner => "script_runner",
            Self::FlowAutomation => "flow_automation",
            Self::NativeExe => "native_exe",
            Self::BatchScript => "batch_script",
            Self::FileOpen => "file_open",
            Self::Unsupported(name) => name,
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub run_id: String,
    pub run_token: Option<String>,
    pub tool_type: ToolType,
    pub tool_name: String,
    pub target: Option<String>,
    pub run_config: Map<String, Value>,
    pub payload: Option<Value>,
    pub callback_url: Option<String>,
}

impl Task {
    pub fn new(
        run_id: impl Into<String>,
        tool_type: ToolType,
        tool_name: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            run_token: None,
            tool_type,
            tool_name: tool_name.into(),
            target: None,
            run_config: Map::new(),
            payload: None,
            callback_url: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_run_config(mut self, run_config: Value) -> Self {
        if let Value::Object(map) = run_config {
            self.run_config = map;
        }
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The target with surrounding whitespace removed; blank counts as unset.
    pub fn target(&self) -> Option<&str> {
        self.target
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
    }

    pub fn run_config_str(&self, key: &str) -> Option<&str> {
        self.run_config
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn run_config_args(&self) -> Vec<String> {
        match self.run_config.get("args") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    Value::Bool(flag) => Some(flag.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Folder-set paths from `payload.paths`, else `run_config.paths`.
    pub fn folder_set_paths(&self) -> Option<Vec<String>> {
        self.payload
            .as_ref()
            .and_then(|payload| string_list(payload.get("paths")))
            .or_else(|| string_list(self.run_config.get("paths")))
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    let paths = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    (!paths.is_empty()).then_some(paths)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimedTool {
    pub tool_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub run_config: Option<Value>,
}

/// Body of a `200` claim response.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimResponse {
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub run_token: Option<String>,
    #[serde(default)]
    pub tool: Option<ClaimedTool>,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

impl ClaimResponse {
    pub fn into_task(self) -> Result<Option<Task>, PortalError> {
        let Some(run_id) = self.run_id.filter(|id| !id.trim().is_empty()) else {
            return Ok(None);
        };
        let tool = self
            .tool
            .ok_or_else(|| PortalError::Malformed(format!("run {run_id} has no tool")))?;
        let run_config = match tool.run_config {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(PortalError::Malformed(format!(
                    "run {run_id} has a non-object run_config: {other}"
                )))
            }
        };

        Ok(Some(Task {
            run_id,
            run_token: self.run_token,
            tool_type: ToolType::parse(&tool.tool_type),
            tool_name: tool.name,
            target: tool.target,
            run_config,
            payload: self.payload.filter(|payload| !payload.is_null()),
            callback_url: self.callback_url,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub status: ExecStatus,
    pub summary: Option<String>,
    pub error_message: Option<String>,
    pub log_path: Option<String>,
    pub log_url: Option<String>,
}
