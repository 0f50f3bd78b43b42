// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::component::ComponentContext;
use crate::lifecycle::ComponentState;

/// Point-in-time performance figures for one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub name: String,
    pub state: ComponentState,
    pub message_count: u64,
    pub error_count: u32,
    pub uptime_seconds: f64,
    /// How long setup took; `None` if it never finished
    pub setup_seconds: Option<f64>,
    /// Errors per message handled; zero before the first message
    pub error_rate: f64,
}

impl PerformanceMetrics {
    pub(crate) fn from_context(context: &ComponentContext) -> Self {
        let message_count = context.message_count();
        let error_count = context.status().error_count();
        let error_rate = if message_count == 0 {
            0.0
        } else {
            f64::from(error_count) / message_count as f64
        };

        Self {
            name: context.name().to_string(),
            state: context.status().state(),
            message_count,
            error_count,
            uptime_seconds: context
                .start_time()
                .map(|started| started.elapsed().as_secs_f64())
                .unwrap_or(0.0),
            setup_seconds: context.setup_duration().map(|d| d.as_secs_f64()),
            error_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComponentConfig;

    #[test]
    fn test_error_rate_is_zero_without_messages() {
        let mut context = ComponentContext::new("quiet".into(), ComponentConfig::default());
        context.status.record_error("boom");

        let metrics = PerformanceMetrics::from_context(&context);
        assert_eq!(metrics.error_count, 1);
        assert_eq!(metrics.error_rate, 0.0);
        assert_eq!(metrics.uptime_seconds, 0.0);
        assert_eq!(metrics.setup_seconds, None);
    }

    #[test]
    fn test_error_rate_divides_errors_by_messages() {
        let mut context = ComponentContext::new("busy".into(), ComponentConfig::default());
        context.message_count = 8;
        context.status.record_error("one");
        context.status.record_error("two");
        context.start_time = Some(std::time::Instant::now());
        context.setup_duration = Some(std::time::Duration::from_millis(250));

        let metrics = PerformanceMetrics::from_context(&context);
        assert_eq!(metrics.error_rate, 0.25);
        assert_eq!(metrics.setup_seconds, Some(0.25));
        assert!(metrics.uptime_seconds >= 0.0);
        assert_eq!(metrics.state, ComponentState::Created);
    }
}
