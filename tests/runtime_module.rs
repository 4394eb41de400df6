use deskagent::executor::{ExecStatus, ExecutionResult, TaskDispatch};
use deskagent::portal::{PortalApi, PortalError, RunReport, Task, ToolType};
use deskagent::runlog::RunLog;
use deskagent::runtime::{AgentLoop, Clock, IterationOutcome, LoopSettings};
use deskagent::shared::RuntimeLog;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

type Journal = RefCell<Vec<String>>;

struct FakeClock {
    now: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    fn new() -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FakeClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

enum Claim {
    Task(Task),
    Empty,
    Fail,
}

struct FakePortal<'j> {
    journal: &'j Journal,
    clock: Option<&'j FakeClock>,
    heartbeat_times: RefCell<Vec<Duration>>,
    claims: RefCell<VecDeque<Claim>>,
    heartbeats: Cell<usize>,
    heartbeat_fails: bool,
    reports: RefCell<Vec<RunReport>>,
}

impl<'j> FakePortal<'j> {
    fn new(journal: &'j Journal, claims: Vec<Claim>) -> Self {
        Self {
            journal,
            clock: None,
            heartbeat_times: RefCell::new(Vec::new()),
            claims: RefCell::new(claims.into()),
            heartbeats: Cell::new(0),
            heartbeat_fails: false,
            reports: RefCell::new(Vec::new()),
        }
    }
}

impl PortalApi for FakePortal<'_> {
    fn send_heartbeat(&self, hostname: &str) -> Result<(), PortalError> {
        assert_eq!(hostname, "WS-01");
        self.heartbeats.set(self.heartbeats.get() + 1);
        if let Some(clock) = self.clock {
            self.heartbeat_times.borrow_mut().push(clock.elapsed());
        }
        self.journal.borrow_mut().push("heartbeat".to_string());
        if self.heartbeat_fails {
            return Err(PortalError::Malformed("down".to_string()));
        }
        Ok(())
    }

    fn claim_task(&self) -> Result<Option<Task>, PortalError> {
        self.journal.borrow_mut().push("claim".to_string());
        match self.claims.borrow_mut().pop_front() {
            Some(Claim::Task(task)) => Ok(Some(task)),
            Some(Claim::Fail) => Err(PortalError::Transport {
                url: "http://portal/api/runner/claim".to_string(),
                reason: "connection refused".to_string(),
            }),
            Some(Claim::Empty) | None => Ok(None),
        }
    }

    fn report_result(&self, report: &RunReport) -> Result<(), PortalError> {
        self.journal
            .borrow_mut()
            .push(format!("report:{}", report.run_id));
        self.reports.borrow_mut().push(report.clone());
        Ok(())
    }
}

/// Returns one scripted result per task and lets each task "take" a while.
struct ScriptedDispatch<'c> {
    clock: &'c FakeClock,
    task_duration: Duration,
    results: RefCell<VecDeque<ExecutionResult>>,
}

impl TaskDispatch for ScriptedDispatch<'_> {
    fn execute(&self, task: &Task, sink: Option<&mut RunLog>) -> ExecutionResult {
        if let Some(sink) = sink {
            sink.append(&format!("executing {}", task.tool_name))
                .expect("append");
        }
        self.clock.advance(self.task_duration);
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| ExecutionResult::success("ok"))
    }
}

fn settings() -> LoopSettings {
    LoopSettings {
        hostname: "WS-01".to_string(),
        poll_interval: Duration::from_secs(10),
        heartbeat_interval: Duration::from_secs(30),
        log_dir: None,
    }
}

fn task(run_id: &str) -> Task {
    Task::new(run_id, ToolType::NativeExe, "Tool")
}

#[test]
fn each_finished_task_is_reported_once_before_the_next_claim() {
    let journal = Journal::default();
    let clock = FakeClock::new();
    let portal = FakePortal::new(
        &journal,
        vec![Claim::Task(task("run-1")), Claim::Task(task("run-2"))],
    );
    let dispatch = ScriptedDispatch {
        clock: &clock,
        task_duration: Duration::ZERO,
        results: RefCell::new(
            vec![
                ExecutionResult::success("EXE launched"),
                ExecutionResult::failed("Exit code: 2"),
            ]
            .into(),
        ),
    };
    let log = RuntimeLog::disabled();
    let mut agent = AgentLoop::new(&portal, &dispatch, &clock, &log, settings());

    agent.run_iterations(3);

    let claims_and_reports = journal
        .borrow()
        .iter()
        .filter(|entry| *entry != "heartbeat")
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(
        claims_and_reports,
        vec!["claim", "report:run-1", "claim", "report:run-2", "claim"]
    );
    let reports = portal.reports.borrow();
    assert_eq!(reports[0].status, ExecStatus::Success);
    assert_eq!(reports[0].summary.as_deref(), Some("EXE launched"));
    assert_eq!(reports[1].status, ExecStatus::Failed);
    assert_eq!(reports[1].error_message.as_deref(), Some("Exit code: 2"));
    assert!(reports[1].log_path.is_none());
}

#[test]
fn claim_errors_are_swallowed_and_the_loop_still_sleeps() {
    let journal = Journal::default();
    let clock = FakeClock::new();
    let portal = FakePortal::new(&journal, vec![Claim::Fail, Claim::Empty]);
    let dispatch = ScriptedDispatch {
        clock: &clock,
        task_duration: Duration::ZERO,
        results: RefCell::new(VecDeque::new()),
    };
    let log = RuntimeLog::disabled();
    let mut agent = AgentLoop::new(&portal, &dispatch, &clock, &log, settings());

    let outcomes = agent.run_iterations(2);

    assert_eq!(outcomes, vec![IterationOutcome::Idle, IterationOutcome::Idle]);
    assert_eq!(
        *clock.sleeps.borrow(),
        vec![Duration::from_secs(10), Duration::from_secs(10)]
    );
    assert!(portal.reports.borrow().is_empty());
}

#[test]
fn heartbeats_stay_within_one_per_interval_with_long_tasks() {
    let journal = Journal::default();
    let clock = FakeClock::new();
    let claims = (0..6).map(|n| Claim::Task(task(&format!("run-{n}")))).collect();
    let mut portal = FakePortal::new(&journal, claims);
    portal.clock = Some(&clock);
    let dispatch = ScriptedDispatch {
        clock: &clock,
        task_duration: Duration::from_secs(45),
        results: RefCell::new(VecDeque::new()),
    };
    let log = RuntimeLog::disabled();
    let mut agent = AgentLoop::new(&portal, &dispatch, &clock, &log, settings());

    agent.start();
    agent.run_iterations(6);

    assert_eq!(agent.heartbeat().interval(), Duration::from_secs(30));
    let sent = portal.heartbeat_times.borrow();
    assert_eq!(agent.heartbeat().last_sent(), sent.last().copied());
    assert_eq!(sent.first(), Some(&Duration::ZERO));
    assert!(sent.len() >= 2);
    assert!(sent.len() <= clock.elapsed().as_secs() as usize / 30 + 1);
    for pair in sent.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(30));
    }
}

#[test]
fn failed_heartbeat_is_logged_and_the_loop_continues() {
    let journal = Journal::default();
    let clock = FakeClock::new();
    let mut portal = FakePortal::new(&journal, vec![Claim::Task(task("run-9"))]);
    portal.heartbeat_fails = true;
    let dispatch = ScriptedDispatch {
        clock: &clock,
        task_duration: Duration::ZERO,
        results: RefCell::new(VecDeque::new()),
    };
    let dir = tempdir().expect("tempdir");
    let log = RuntimeLog::to_file(dir.path().join("agent.log"));
    let mut agent = AgentLoop::new(&portal, &dispatch, &clock, &log, settings());

    agent.start();
    let outcome = agent.run_iteration();

    assert_eq!(
        outcome,
        IterationOutcome::Completed {
            run_id: "run-9".to_string(),
            status: ExecStatus::Success,
            reported: true,
        }
    );
    let raw = fs::read_to_string(dir.path().join("agent.log")).expect("agent log");
    assert!(raw.contains("heartbeat.initial"));
    assert!(raw.contains("report.sent"));
}

#[test]
fn running_results_are_neither_reported_nor_finalized() {
    let journal = Journal::default();
    let clock = FakeClock::new();
    let portal = FakePortal::new(&journal, vec![Claim::Task(task("flow-1"))]);
    let dispatch = ScriptedDispatch {
        clock: &clock,
        task_duration: Duration::ZERO,
        results: RefCell::new(vec![ExecutionResult::running("Flow started")].into()),
    };
    let dir = tempdir().expect("tempdir");
    let log = RuntimeLog::disabled();
    let loop_settings = LoopSettings {
        log_dir: Some(dir.path().to_path_buf()),
        ..settings()
    };
    let mut agent = AgentLoop::new(&portal, &dispatch, &clock, &log, loop_settings);

    let outcome = agent.run_iteration();

    assert_eq!(
        outcome,
        IterationOutcome::Completed {
            run_id: "flow-1".to_string(),
            status: ExecStatus::Running,
            reported: false,
        }
    );
    assert!(portal.reports.borrow().is_empty());
    let transcript =
        fs::read_to_string(RunLog::file_path(dir.path(), "flow-1")).expect("transcript");
    assert!(transcript.contains("executing Tool"));
    assert!(!transcript.contains("=== End ==="));
}

#[test]
fn finished_tasks_report_their_transcript_path() {
    let journal = Journal::default();
    let clock = FakeClock::new();
    let portal = FakePortal::new(&journal, vec![Claim::Task(task("run-5"))]);
    let dispatch = ScriptedDispatch {
        clock: &clock,
        task_duration: Duration::ZERO,
        results: RefCell::new(VecDeque::new()),
    };
    let dir = tempdir().expect("tempdir");
    let log = RuntimeLog::disabled();
    let loop_settings = LoopSettings {
        log_dir: Some(dir.path().to_path_buf()),
        ..settings()
    };
    let mut agent = AgentLoop::new(&portal, &dispatch, &clock, &log, loop_settings);

    agent.run_iteration();

    let expected = RunLog::file_path(dir.path(), "run-5");
    let reports = portal.reports.borrow();
    assert_eq!(
        reports[0].log_path.as_deref(),
        Some(expected.display().to_string().as_str())
    );
    let transcript = fs::read_to_string(expected).expect("transcript");
    assert!(transcript.contains("Status: success"));
}
