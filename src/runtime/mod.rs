pub mod agent_loop;
pub mod clock;
pub mod heartbeat;

pub use agent_loop::{AgentLoop, IterationOutcome, LoopSettings};
pub use clock::{Clock, SystemClock};
pub use heartbeat::HeartbeatSchedule;
