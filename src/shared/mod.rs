pub mod logging;
pub mod time;

pub use logging::{append_json_log_line, LogLevel, RuntimeLog};
pub use time::{local_timestamp, now_secs};
