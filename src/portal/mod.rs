//! Task acquisition and result reporting against the portal.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpPortal, CLAIM_PATH, HEARTBEAT_PATH, MACHINE_KEY_HEADER, REPORT_PATH};
pub use error::PortalError;
pub use types::{ClaimResponse, ClaimedTool, RunReport, Task, ToolType};

pub trait PortalApi {
    fn send_heartbeat(&self, hostname: &str) -> Result<(), PortalError>;

    /// `Ok(None)` when the portal has nothing queued for this machine.
    fn claim_task(&self) -> Result<Option<Task>, PortalError>;

    fn report_result(&self, report: &RunReport) -> Result<(), PortalError>;
}
