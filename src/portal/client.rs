use super::error::{body_preview, from_ureq};
use super::{ClaimResponse, PortalApi, PortalError, RunReport, Task};
use crate::config::AgentConfig;
use serde_json::json;
use std::time::Duration;

pub const HEARTBEAT_PATH: &str = "api/runner/heartbeat";
pub const CLAIM_PATH: &str = "api/runner/claim";
pub const REPORT_PATH: &str = "api/runner/report";
pub const MACHINE_KEY_HEADER: &str = "X-Machine-Key";

const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking portal client authenticated with the machine key.
pub struct HttpPortal {
    base_url: String,
    machine_key: String,
    request_timeout: Duration,
    agent: ureq::Agent,
}

impl HttpPortal {
    pub fn new(
        base_url: impl Into<String>,
        machine_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            machine_key: machine_key.into(),
            request_timeout,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config.portal_url.clone(),
            config.machine_key.clone(),
            config.request_timeout(),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn post(&self, url: &str, timeout: Duration) -> ureq::Request {
        self.agent
            .post(url)
            .set(MACHINE_KEY_HEADER, &self.machine_key)
            .timeout(timeout)
    }
}

impl PortalApi for HttpPortal {
    fn send_heartbeat(&self, hostname: &str) -> Result<(), PortalError> {
        let url = self.endpoint(HEARTBEAT_PATH);
        self.post(&url, HEARTBEAT_TIMEOUT)
            .send_json(json!({ "hostname": hostname }))
            .map_err(|err| from_ureq(&url, err))?;
        Ok(())
    }

    fn claim_task(&self) -> Result<Option<Task>, PortalError> {
        let url = self.endpoint(CLAIM_PATH);
        let response = self
            .post(&url, self.request_timeout)
            .call()
            .map_err(|err| from_ureq(&url, err))?;
        if response.status() == 204 {
            return Ok(None);
        }

        let body = response.into_string().map_err(|err| PortalError::Decode {
            url: url.clone(),
            reason: err.to_string(),
        })?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let claim: ClaimResponse =
            serde_json::from_str(&body).map_err(|err| PortalError::Decode {
                url: url.clone(),
                reason: format!("{err}: {}", body_preview(&body)),
            })?;
        claim.into_task()
    }

    fn report_result(&self, report: &RunReport) -> Result<(), PortalError> {
        let url = self.endpoint(REPORT_PATH);
        let body = serde_json::to_value(report).map_err(|err| PortalError::Decode {
            url: url.clone(),
            reason: err.to_string(),
        })?;
        self.post(&url, self.request_timeout)
            .send_json(body)
            .map_err(|err| from_ureq(&url, err))?;
        Ok(())
    }
}
