use super::{Clock, HeartbeatSchedule};
use crate::config::AgentConfig;
use crate::executor::{ExecStatus, TaskDispatch};
use crate::portal::{PortalApi, RunReport, Task};
use crate::runlog::RunLog;
use crate::shared::RuntimeLog;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    pub hostname: String,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub log_dir: Option<PathBuf>,
}

impl LoopSettings {
    pub fn from_config(config: &AgentConfig, hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            poll_interval: config.poll_interval(),
            heartbeat_interval: config.heartbeat_interval(),
            log_dir: config.log_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    Idle,
    Completed {
        run_id: String,
        status: ExecStatus,
        reported: bool,
    },
}

/// Heartbeat, claim, execute, report, sleep; one task at a time on one
/// thread. A long task delays the next heartbeat.
pub struct AgentLoop<'a> {
    portal: &'a dyn PortalApi,
    dispatcher: &'a dyn TaskDispatch,
    clock: &'a dyn Clock,
    log: &'a RuntimeLog,
    settings: LoopSettings,
    heartbeat: HeartbeatSchedule,
}

impl<'a> AgentLoop<'a> {
    pub fn new(
        portal: &'a dyn PortalApi,
        dispatcher: &'a dyn TaskDispatch,
        clock: &'a dyn Clock,
        log: &'a RuntimeLog,
        settings: LoopSettings,
    ) -> Self {
        let heartbeat = HeartbeatSchedule::new(settings.heartbeat_interval);
        Self {
            portal,
            dispatcher,
            clock,
            log,
            settings,
            heartbeat,
        }
    }

    pub fn heartbeat(&self) -> &HeartbeatSchedule {
        &self.heartbeat
    }

    /// Sends the startup heartbeat, which becomes the cadence reference.
    pub fn start(&mut self) {
        self.log.info(
            "agent.start",
            &format!(
                "hostname={} poll={}s heartbeat={}s",
                self.settings.hostname,
                self.settings.poll_interval.as_secs(),
                self.settings.heartbeat_interval.as_secs()
            ),
        );
        if self.send_heartbeat() {
            self.log.info("heartbeat.initial", "initial heartbeat sent");
        } else {
            self.log
                .warn("heartbeat.initial", "WARNING: initial heartbeat failed");
        }
    }

    pub fn send_heartbeat(&mut self) -> bool {
        let now = self.clock.elapsed();
        self.heartbeat.mark_sent(now);
        match self.portal.send_heartbeat(&self.settings.hostname) {
            Ok(()) => true,
            Err(err) => {
                self.log
                    .warn("heartbeat.failed", &format!("heartbeat failed: {err}"));
                false
            }
        }
    }

    /// Errors count as "no task" and are only logged.
    pub fn claim_task(&self) -> Option<Task> {
        match self.portal.claim_task() {
            Ok(Some(task)) => {
                self.log.info(
                    "task.claimed",
                    &format!("{} (type: {}, run_id: {})", task.tool_name, task.tool_type, task.run_id),
                );
                Some(task)
            }
            Ok(None) => None,
            Err(err) => {
                self.log
                    .warn("claim.failed", &format!("claim failed: {err}"));
                None
            }
        }
    }

    pub fn report_result(&self, report: &RunReport) -> bool {
        match self.portal.report_result(report) {
            Ok(()) => {
                self.log.info(
                    "report.sent",
                    &format!("result reported: {} {}", report.run_id, report.status.as_str()),
                );
                true
            }
            Err(err) => {
                self.log.error(
                    "report.failed",
                    &format!("report for {} failed: {err}", report.run_id),
                );
                false
            }
        }
    }

    /// One heartbeat check and claim, without the trailing poll sleep.
    pub fn poll_once(&mut self) -> IterationOutcome {
        if self.heartbeat.is_due(self.clock.elapsed()) {
            self.send_heartbeat();
        }
        match self.claim_task() {
            Some(task) => self.process_task(task),
            None => IterationOutcome::Idle,
        }
    }

    pub fn run_iteration(&mut self) -> IterationOutcome {
        let outcome = self.poll_once();
        self.clock.sleep(self.settings.poll_interval);
        outcome
    }

    pub fn run_iterations(&mut self, count: usize) -> Vec<IterationOutcome> {
        (0..count).map(|_| self.run_iteration()).collect()
    }

    pub fn run_forever(&mut self) -> ! {
        loop {
            self.run_iteration();
        }
    }

    fn open_run_log(&self, task: &Task) -> Option<RunLog> {
        let dir = self.settings.log_dir.as_ref()?;
        match RunLog::create(dir, &task.run_id, &task.tool_name) {
            Ok(run_log) => Some(run_log),
            Err(err) => {
                self.log.warn("runlog.failed", &err.to_string());
                None
            }
        }
    }

    fn process_task(&mut self, task: Task) -> IterationOutcome {
        let mut run_log = self.open_run_log(&task);
        let result = self.dispatcher.execute(&task, run_log.as_mut());

        if result.status == ExecStatus::Running {
            self.log.info(
                "task.running",
                &format!("{} started, waiting for callback", task.run_id),
            );
            return IterationOutcome::Completed {
                run_id: task.run_id,
                status: result.status,
                reported: false,
            };
        }

        if let Some(run_log) = run_log.as_mut() {
            let _ = run_log.finalize(result.status.as_str());
        }
        let report = RunReport {
            run_id: task.run_id.clone(),
            status: result.status,
            summary: result.summary,
            error_message: result.error_message,
            log_path: run_log
                .as_ref()
                .map(|run_log| run_log.path().display().to_string()),
            log_url: None,
        };
        let reported = self.report_result(&report);
        IterationOutcome::Completed {
            run_id: task.run_id,
            status: report.status,
            reported,
        }
    }
}
