use std::time::Duration;

/// Errors a component may accumulate before it is degraded to `error`
pub const DEFAULT_ERROR_THRESHOLD: u32 = 10;
/// Time allowed for a single component's setup hook
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
/// Grace period between a shutdown request and force-cancellation
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
/// Interval between health monitor sweeps
pub const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(1);
/// Capacity of a stream when a connection does not specify one
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 100;
/// How long a send may wait for room in a full stream
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);
/// Receive timeout used by built-in components between shutdown checks
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_LOG_LEVEL: &str = "info";
