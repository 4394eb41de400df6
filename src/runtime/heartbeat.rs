use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSchedule {
    interval: Duration,
    last_sent: Option<Duration>,
}

impl HeartbeatSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_sent(&self) -> Option<Duration> {
        self.last_sent
    }

    /// Due when nothing was sent yet or a full interval has passed.
    pub fn is_due(&self, now: Duration) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }

    /// Records an attempt at `now`, whether or not it reached the portal.
    pub fn mark_sent(&mut self, now: Duration) {
        self.last_sent = Some(now);
    }
}
