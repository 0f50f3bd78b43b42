// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::time::Duration;

use crate::config::consts::{
    DEFAULT_ERROR_THRESHOLD, DEFAULT_HEALTH_CHECK_INTERVAL, DEFAULT_LOG_LEVEL, DEFAULT_SEND_TIMEOUT,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_STARTUP_TIMEOUT, DEFAULT_STREAM_BUFFER_SIZE,
};

/// Harness-wide runtime settings.
///
/// Every field is optional in a pipeline file. Durations are given in
/// (fractional) seconds.
///
/// # Fields
/// * `startup_timeout` - Limit on each component's setup hook
/// * `shutdown_timeout` - Grace period before stuck components are force-cancelled
/// * `health_check_interval` - Period of the health monitor
/// * `stream_buffer_size` - Capacity of connections that don't set their own
/// * `send_timeout` - How long a send waits on a full stream
/// * `enable_health_monitoring` - Run the periodic health monitor
/// * `enable_performance_monitoring` - Collect per-component metrics in the report
/// * `log_level` - Default `tracing` filter for the binary
/// * `error_threshold` - Default health threshold for components
///
/// # Example
/// ```yaml
/// harness:
///   startup_timeout: 10
///   shutdown_timeout: 2.5
///   stream_buffer_size: 64
///   log_level: debug
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    #[serde(deserialize_with = "seconds::deserialize")]
    pub startup_timeout: Duration,
    #[serde(deserialize_with = "seconds::deserialize")]
    pub shutdown_timeout: Duration,
    #[serde(deserialize_with = "seconds::deserialize")]
    pub health_check_interval: Duration,
    pub stream_buffer_size: usize,
    #[serde(deserialize_with = "seconds::deserialize")]
    pub send_timeout: Duration,
    pub enable_health_monitoring: bool,
    pub enable_performance_monitoring: bool,
    pub log_level: String,
    pub error_threshold: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
            stream_buffer_size: DEFAULT_STREAM_BUFFER_SIZE,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            enable_health_monitoring: true,
            enable_performance_monitoring: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }
}

mod seconds {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_section_uses_defaults() {
        let config: HarnessConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.error_threshold, 10);
    }

    #[test]
    fn test_fractional_seconds() {
        let config: HarnessConfig =
            serde_yaml::from_str("shutdown_timeout: 2.5\nsend_timeout: 0.01\nstartup_timeout: 3").unwrap();
        assert_eq!(config.shutdown_timeout, Duration::from_millis(2500));
        assert_eq!(config.send_timeout, Duration::from_millis(10));
        assert_eq!(config.startup_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let result: Result<HarnessConfig, _> = serde_yaml::from_str("shutdown_timeout: -1");
        assert!(result.is_err());
    }
}
